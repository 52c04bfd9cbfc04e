use alloy::{
    primitives::Address,
    providers::{ProviderBuilder, RootProvider},
    sol,
    transports::http::{reqwest::Url, Client, Http},
};
use async_trait::async_trait;
use tracing::debug;

use super::{ChainError, ContractReader};

sol! {
    #[sol(rpc)]
    interface IERC20Metadata {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
    }
}

sol! {
    #[sol(rpc)]
    interface IVesperPool {
        function VERSION() external view returns (string memory);
        function token() external view returns (address);
    }
}

/// [`ContractReader`] backed by a JSON-RPC node over HTTP.
#[derive(Clone)]
pub struct RpcContractReader {
    provider: RootProvider<Http<Client>>,
}

impl RpcContractReader {
    pub fn connect(node_url: &str) -> Result<Self, ChainError> {
        let url: Url = node_url.parse().map_err(|e| ChainError::InvalidNodeUrl {
            url: node_url.to_string(),
            reason: format!("{}", e),
        })?;

        Ok(Self {
            provider: ProviderBuilder::new().on_http(url),
        })
    }
}

fn call_failed(contract: Address, method: &'static str, err: impl std::fmt::Display) -> ChainError {
    debug!("{}() on {} failed: {}", method, contract, err);
    ChainError::CallFailed {
        contract,
        method,
        reason: err.to_string(),
    }
}

#[async_trait]
impl ContractReader for RpcContractReader {
    async fn name(&self, contract: Address) -> Result<String, ChainError> {
        let erc20 = IERC20Metadata::new(contract, &self.provider);
        let result = erc20.name().call().await.map_err(|e| call_failed(contract, "name", e))?;
        Ok(result._0)
    }

    async fn symbol(&self, contract: Address) -> Result<String, ChainError> {
        let erc20 = IERC20Metadata::new(contract, &self.provider);
        let result = erc20.symbol().call().await.map_err(|e| call_failed(contract, "symbol", e))?;
        Ok(result._0)
    }

    async fn decimals(&self, contract: Address) -> Result<u8, ChainError> {
        let erc20 = IERC20Metadata::new(contract, &self.provider);
        let result = erc20
            .decimals()
            .call()
            .await
            .map_err(|e| call_failed(contract, "decimals", e))?;
        Ok(result._0)
    }

    async fn version(&self, pool: Address) -> Result<String, ChainError> {
        let vesper_pool = IVesperPool::new(pool, &self.provider);
        let result = vesper_pool
            .VERSION()
            .call()
            .await
            .map_err(|e| call_failed(pool, "VERSION", e))?;
        Ok(result._0)
    }

    async fn underlying_token(&self, pool: Address) -> Result<Address, ChainError> {
        let vesper_pool = IVesperPool::new(pool, &self.provider);
        let result = vesper_pool.token().call().await.map_err(|e| call_failed(pool, "token", e))?;
        Ok(result._0)
    }
}
