use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Base URL every pool and token logo is served from.
pub const LOGO_BASE_URL: &str =
    "https://raw.githubusercontent.com/vesperfi/metadata/master/src/logos";

/// Symbol of the governance token whose logo doubles as the token-list logo.
pub const GOVERNANCE_SYMBOL: &str = "VSP";

/// The whole registry document. Keys this crate does not model are kept in
/// `extra` so rewriting the file never drops hand-edited data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub version: String,
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub name: String,
    #[serde(rename = "poolName")]
    pub pool_name: String,
    pub address: String,
    pub asset: String,
    pub birthblock: u64,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    #[serde(rename = "riskLevel")]
    pub risk_level: u8,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    #[serde(rename = "type")]
    pub pool_type: PoolType,
    #[serde(rename = "supersededBy", default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral: Option<Collateral>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Underlying token a pool accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collateral {
    pub address: String,
    pub decimals: u8,
    pub symbol: String,
    #[serde(rename = "type")]
    pub collateral_type: CollateralType,
    #[serde(rename = "isWrappedToken", default, skip_serializing_if = "Option::is_none")]
    pub is_wrapped_token: Option<bool>,
    /// Reference to the pool the collateral comes from on an external protocol
    #[serde(rename = "poolId", default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
}

/// Plain (non-pool) token entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Alpha,
    Back,
    Beta,
    Orbit,
    Prod,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoolType {
    Earn,
    Governance,
    Grow,
    VfrC,
    VfrS,
}

impl PoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolType::Earn => "earn",
            PoolType::Governance => "governance",
            PoolType::Grow => "grow",
            PoolType::VfrC => "vfr-c",
            PoolType::VfrS => "vfr-s",
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollateralType {
    #[default]
    Normal,
    Rebasing,
    Compounding,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown collateral type '{0}' (expected normal, rebasing or compounding)")]
pub struct ParseCollateralTypeError(String);

impl FromStr for CollateralType {
    type Err = ParseCollateralTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(CollateralType::Normal),
            "rebasing" => Ok(CollateralType::Rebasing),
            "compounding" => Ok(CollateralType::Compounding),
            _ => Err(ParseCollateralTypeError(s.to_string())),
        }
    }
}

/// Logo URL for an image name (already lower-cased, no extension).
pub fn logo_url(image_name: &str) -> String {
    format!("{}/{}.svg", LOGO_BASE_URL, image_name)
}

impl MetadataDocument {
    /// Find a pool by address (case-insensitive) and chain id.
    pub fn find_pool(&self, address: &str, chain_id: u64) -> Option<&Pool> {
        self.pools
            .iter()
            .find(|pool| pool.chain_id == chain_id && pool.address.eq_ignore_ascii_case(address))
    }

    pub fn contains_pool(&self, address: &str, chain_id: u64) -> bool {
        self.find_pool(address, chain_id).is_some()
    }

    /// Append a pool and restore the canonical ordering. Returns `false`
    /// without touching the list when the pool is already registered.
    pub fn insert_pool(&mut self, pool: Pool) -> bool {
        if self.contains_pool(&pool.address, pool.chain_id) {
            return false;
        }
        self.pools.push(pool);
        self.sort_pools();
        true
    }

    /// Chain id ascending, newest pool first within a chain. The sort is
    /// stable so pools sharing both keys keep their relative order.
    pub fn sort_pools(&mut self) {
        self.pools.sort_by(|a, b| {
            a.chain_id
                .cmp(&b.chain_id)
                .then_with(|| b.birthblock.cmp(&a.birthblock))
        });
    }

    pub fn governance_token(&self) -> Option<&Token> {
        self.tokens.iter().find(|token| token.symbol == GOVERNANCE_SYMBOL)
    }
}
