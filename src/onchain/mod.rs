//! Read-only access to pool and token contracts.

pub mod rpc;

pub use rpc::RpcContractReader;

use alloy::primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Invalid node URL {url}: {reason}")]
    InvalidNodeUrl { url: String, reason: String },
    #[error("Contract call {method}() on {contract} failed: {reason}")]
    CallFailed {
        contract: Address,
        method: &'static str,
        reason: String,
    },
}

impl ChainError {
    /// Whether the node reported an execution revert (as opposed to a
    /// transport failure).
    pub fn is_revert(&self) -> bool {
        match self {
            ChainError::CallFailed { reason, .. } => reason.to_lowercase().contains("revert"),
            _ => false,
        }
    }
}

/// The handful of view calls the registry needs. `name`, `symbol` and
/// `decimals` work on pools and plain ERC-20 tokens alike; `version` and
/// `underlying_token` only make sense on pools.
#[async_trait]
pub trait ContractReader: Send + Sync {
    async fn name(&self, contract: Address) -> Result<String, ChainError>;
    async fn symbol(&self, contract: Address) -> Result<String, ChainError>;
    async fn decimals(&self, contract: Address) -> Result<u8, ChainError>;
    async fn version(&self, pool: Address) -> Result<String, ChainError>;
    async fn underlying_token(&self, pool: Address) -> Result<Address, ChainError>;
}
