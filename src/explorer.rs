use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::chains::Chain;
use crate::config::Settings;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Response error {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid block number '{0}'")]
    InvalidBlockNumber(String),
}

/// A transaction as listed by an Etherscan-compatible `txlist` endpoint.
/// Only the fields the registry needs are decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
    #[serde(default)]
    pub contract_address: String,
    pub block_number: String,
}

#[derive(Debug, Deserialize)]
struct TxListResponse {
    result: Vec<ExplorerTransaction>,
}

#[async_trait]
pub trait TransactionExplorer: Send + Sync {
    /// Earliest transaction touching `address` at or after `start_block`.
    async fn first_transaction(
        &self,
        address: Address,
        start_block: u64,
    ) -> Result<Option<ExplorerTransaction>, ExplorerError>;
}

/// Client for the Etherscan family of explorer APIs.
pub struct EtherscanClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl EtherscanClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn for_chain(chain: Chain, settings: &Settings) -> Self {
        Self::new(chain.descriptor().explorer_api, settings.explorer_api_key.clone())
    }
}

#[async_trait]
impl TransactionExplorer for EtherscanClient {
    async fn first_transaction(
        &self,
        address: Address,
        start_block: u64,
    ) -> Result<Option<ExplorerTransaction>, ExplorerError> {
        let address = address.to_checksum(None);
        let start_block = start_block.to_string();
        let mut query = vec![
            ("module", "account"),
            ("action", "txlist"),
            ("address", address.as_str()),
            ("startblock", start_block.as_str()),
            ("page", "1"),
            ("offset", "1"),
            ("sort", "asc"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.as_str()));
        }

        debug!("Querying {} for the first transaction of {}", self.base_url, address);
        let response = self.client.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExplorerError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: TxListResponse = serde_json::from_str(&body)?;
        Ok(parsed.result.into_iter().next())
    }
}

/// Block a contract was deployed at, or 0 when the explorer cannot tell.
///
/// The first transaction listed for an address is its creation only when
/// the explorer reports the same address as the created contract; anything
/// else (or no transaction at all) means the explorer data is unusable.
pub async fn birth_block(
    explorer: &dyn TransactionExplorer,
    address: Address,
    chain: Chain,
) -> Result<u64, ExplorerError> {
    let start_block = chain.descriptor().scan_start_block;
    let Some(tx) = explorer.first_transaction(address, start_block).await? else {
        warn!("No transactions found for {} on {}, birth block set to 0", address, chain);
        return Ok(0);
    };

    if !tx.contract_address.eq_ignore_ascii_case(&address.to_checksum(None)) {
        warn!(
            "First transaction of {} did not create it (created {:?}), birth block set to 0",
            address, tx.contract_address
        );
        return Ok(0);
    }

    tx.block_number
        .trim()
        .parse::<u64>()
        .map_err(|_| ExplorerError::InvalidBlockNumber(tx.block_number.clone()))
}
