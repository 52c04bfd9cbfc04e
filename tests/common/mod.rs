#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::json;
use vesper_metadata::explorer::{ExplorerError, ExplorerTransaction, TransactionExplorer};
use vesper_metadata::onchain::{ChainError, ContractReader};

pub const VETH: &str = "0xd1C117319B3595fbc39b471AB1fd485629eb05F2";
pub const WETH: &str = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
pub const USDC_POLYGON: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
pub const VSP: &str = "0x1b40183EFB4Dd766f11bDa7A7c3AD8982e998421";

pub fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

#[derive(Clone, Default)]
pub struct MockContract {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub version: String,
    pub token: Option<Address>,
}

/// In-memory contracts keyed by address.
#[derive(Default)]
pub struct MockReader {
    contracts: HashMap<Address, MockContract>,
    failing_method: Option<&'static str>,
    calls: AtomicUsize,
}

impl MockReader {
    pub fn with_pool(
        mut self,
        pool: Address,
        name: &str,
        symbol: &str,
        version: &str,
        token: Address,
    ) -> Self {
        self.contracts.insert(
            pool,
            MockContract {
                name: name.to_string(),
                symbol: symbol.to_string(),
                decimals: 18,
                version: version.to_string(),
                token: Some(token),
            },
        );
        self
    }

    pub fn with_token(mut self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.contracts.insert(
            token,
            MockContract {
                symbol: symbol.to_string(),
                decimals,
                ..Default::default()
            },
        );
        self
    }

    pub fn failing(mut self, method: &'static str) -> Self {
        self.failing_method = Some(method);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, contract: Address, method: &'static str) -> Result<&MockContract, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_method == Some(method) {
            return Err(ChainError::CallFailed {
                contract,
                method,
                reason: "execution reverted".to_string(),
            });
        }
        self.contracts.get(&contract).ok_or(ChainError::CallFailed {
            contract,
            method,
            reason: "no contract code".to_string(),
        })
    }
}

#[async_trait]
impl ContractReader for MockReader {
    async fn name(&self, contract: Address) -> Result<String, ChainError> {
        Ok(self.lookup(contract, "name")?.name.clone())
    }

    async fn symbol(&self, contract: Address) -> Result<String, ChainError> {
        Ok(self.lookup(contract, "symbol")?.symbol.clone())
    }

    async fn decimals(&self, contract: Address) -> Result<u8, ChainError> {
        Ok(self.lookup(contract, "decimals")?.decimals)
    }

    async fn version(&self, pool: Address) -> Result<String, ChainError> {
        Ok(self.lookup(pool, "VERSION")?.version.clone())
    }

    async fn underlying_token(&self, pool: Address) -> Result<Address, ChainError> {
        let contract = self.lookup(pool, "token")?;
        contract.token.ok_or(ChainError::CallFailed {
            contract: pool,
            method: "token",
            reason: "execution reverted".to_string(),
        })
    }
}

/// Explorer returning a fixed first transaction, or a fixed HTTP status.
pub enum StaticExplorer {
    Creation {
        contract_address: String,
        block_number: u64,
    },
    Empty,
    Status(u16),
}

#[async_trait]
impl TransactionExplorer for StaticExplorer {
    async fn first_transaction(
        &self,
        _address: Address,
        _start_block: u64,
    ) -> Result<Option<ExplorerTransaction>, ExplorerError> {
        match self {
            StaticExplorer::Creation {
                contract_address,
                block_number,
            } => Ok(Some(ExplorerTransaction {
                contract_address: contract_address.clone(),
                block_number: block_number.to_string(),
            })),
            StaticExplorer::Empty => Ok(None),
            StaticExplorer::Status(status) => Err(ExplorerError::Status {
                status: *status,
                reason: "Service Unavailable".to_string(),
            }),
        }
    }
}

/// Write a metadata document with one Ethereum pool and the VSP token.
pub fn seed_metadata(dir: &Path) -> PathBuf {
    let path = dir.join("vesper-metadata.json");
    let document = json!({
        "version": "4.2.0",
        "pools": [{
            "name": "vaDAI",
            "poolName": "vaDAI Pool",
            "address": "0x0538C8bAc84E95A9dF8aC10Aad17DbE81b9E36ee",
            "asset": "DAI",
            "birthblock": 13_000_000u64,
            "chainId": 1,
            "riskLevel": 4,
            "stage": "prod",
            "version": 3,
            "symbol": "vaDAI",
            "decimals": 18,
            "logoURI": "https://raw.githubusercontent.com/vesperfi/metadata/master/src/logos/vadai.svg",
            "type": "grow"
        }],
        "tokens": [{
            "address": VSP,
            "chainId": 1,
            "symbol": "VSP",
            "decimals": 18,
            "logoURI": "https://raw.githubusercontent.com/vesperfi/metadata/master/src/logos/vsp.svg",
            "name": "Vesper"
        }]
    });
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}
