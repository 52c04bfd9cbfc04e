use std::fmt;

use crate::config::ConfigError;

/// Chains the registry tracks pools on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Ethereum,
    Optimism,
    Bnb,
    Polygon,
    Base,
    Avalanche,
}

/// Static per-chain facts: where to read, where to look up history and how
/// the chain names its native asset.
#[derive(Debug)]
pub struct ChainDescriptor {
    pub chain: Chain,
    pub chain_id: u64,
    pub name: &'static str,
    /// Environment variable holding the JSON-RPC node URL
    pub node_url_env: &'static str,
    pub explorer_api: &'static str,
    pub native_symbol: &'static str,
    pub wrapped_symbol: &'static str,
    /// First block worth scanning when looking for a pool's deployment
    pub scan_start_block: u64,
}

const DEFAULT_SCAN_START_BLOCK: u64 = 11_400_000;

static CHAINS: [ChainDescriptor; 6] = [
    ChainDescriptor {
        chain: Chain::Ethereum,
        chain_id: 1,
        name: "ethereum",
        node_url_env: "ETH_NODE_URL",
        explorer_api: "https://api.etherscan.io/api",
        native_symbol: "ETH",
        wrapped_symbol: "WETH",
        scan_start_block: DEFAULT_SCAN_START_BLOCK,
    },
    ChainDescriptor {
        chain: Chain::Optimism,
        chain_id: 10,
        name: "optimism",
        node_url_env: "OPTIMISM_NODE_URL",
        explorer_api: "https://api-optimistic.etherscan.io/api",
        native_symbol: "ETH",
        wrapped_symbol: "WETH",
        scan_start_block: DEFAULT_SCAN_START_BLOCK,
    },
    ChainDescriptor {
        chain: Chain::Bnb,
        chain_id: 56,
        name: "bnb",
        node_url_env: "BNB_NODE_URL",
        explorer_api: "https://api.bscscan.com/api",
        native_symbol: "BNB",
        wrapped_symbol: "WBNB",
        scan_start_block: DEFAULT_SCAN_START_BLOCK,
    },
    ChainDescriptor {
        chain: Chain::Polygon,
        chain_id: 137,
        name: "polygon",
        node_url_env: "POLYGON_NODE_URL",
        explorer_api: "https://api.polygonscan.com/api",
        native_symbol: "MATIC",
        wrapped_symbol: "WMATIC",
        scan_start_block: DEFAULT_SCAN_START_BLOCK,
    },
    ChainDescriptor {
        chain: Chain::Base,
        chain_id: 8453,
        name: "base",
        node_url_env: "BASE_NODE_URL",
        explorer_api: "https://api.basescan.org/api",
        native_symbol: "ETH",
        wrapped_symbol: "WETH",
        scan_start_block: DEFAULT_SCAN_START_BLOCK,
    },
    ChainDescriptor {
        chain: Chain::Avalanche,
        chain_id: 43114,
        name: "avalanche",
        node_url_env: "AVALANCHE_NODE_URL",
        explorer_api: "https://api.snowtrace.io/api",
        native_symbol: "AVAX",
        wrapped_symbol: "WAVAX",
        scan_start_block: 9_450_000,
    },
];

impl Chain {
    /// Pools anywhere else are considered riskier by default.
    pub const PRIMARY: Chain = Chain::Ethereum;

    pub fn from_id(chain_id: u64) -> Result<Self, ConfigError> {
        CHAINS
            .iter()
            .find(|descriptor| descriptor.chain_id == chain_id)
            .map(|descriptor| descriptor.chain)
            .ok_or(ConfigError::UnsupportedChain(chain_id))
    }

    pub fn descriptor(self) -> &'static ChainDescriptor {
        let index = match self {
            Chain::Ethereum => 0,
            Chain::Optimism => 1,
            Chain::Bnb => 2,
            Chain::Polygon => 3,
            Chain::Base => 4,
            Chain::Avalanche => 5,
        };
        &CHAINS[index]
    }

    pub fn id(self) -> u64 {
        self.descriptor().chain_id
    }

    pub fn all() -> impl Iterator<Item = Chain> {
        CHAINS.iter().map(|descriptor| descriptor.chain)
    }

    pub fn is_primary(self) -> bool {
        self == Self::PRIMARY
    }

    /// Replace the chain's wrapped native symbol by the native one
    /// (`WETH` on Ethereum becomes `ETH`). Other symbols pass through.
    pub fn unwrap_asset(self, symbol: &str) -> &str {
        let descriptor = self.descriptor();
        if symbol == descriptor.wrapped_symbol {
            descriptor.native_symbol
        } else {
            symbol
        }
    }

    /// Inverse of [`Chain::unwrap_asset`].
    pub fn wrap_asset(self, symbol: &str) -> &str {
        let descriptor = self.descriptor();
        if symbol == descriptor.native_symbol {
            descriptor.wrapped_symbol
        } else {
            symbol
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.descriptor().name, self.id())
    }
}
