use std::path::Path;

use alloy::primitives::Address;
use thiserror::Error;
use tracing::info;

use crate::chains::Chain;
use crate::config::{ConfigError, Settings};
use crate::document::{DocumentError, MetadataFile};
use crate::explorer::{birth_block, EtherscanClient, ExplorerError, TransactionExplorer};
use crate::onchain::{ChainError, ContractReader, RpcContractReader};
use crate::types::{logo_url, Collateral, CollateralType, MetadataDocument, Pool, PoolType, Stage};

/// Name prefix marking pools with a riskier strategy set.
const RISKY_PREFIXES: [&str; 2] = ["va", "ve"];
/// Name prefix marking earn pools.
const EARN_PREFIX: &str = "ve";

const DEFAULT_RISK_LEVEL: u8 = 3;
const ELEVATED_RISK_LEVEL: u8 = 4;

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("Explorer lookup failed: {0}")]
    Explorer(#[from] ExplorerError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Unparseable pool version '{0}'")]
    InvalidVersion(String),
}

/// What the operator asked to register.
#[derive(Debug, Clone)]
pub struct PoolRequest {
    pub address: Address,
    pub chain: Chain,
    pub collateral_type: CollateralType,
    pub pool_id: Option<String>,
}

impl PoolRequest {
    pub fn new(address: Address, chain: Chain) -> Self {
        Self {
            address,
            chain,
            collateral_type: CollateralType::default(),
            pool_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Added(Pool),
    AlreadyPresent,
}

/// Everything read from the pool and its collateral token.
#[derive(Debug, Clone)]
pub struct OnChainPool {
    pub pool_name: String,
    pub version: String,
    pub symbol: String,
    pub decimals: u8,
    pub collateral_address: Address,
    pub collateral_symbol: String,
    pub collateral_decimals: u8,
}

pub struct Registrar<'a> {
    reader: &'a dyn ContractReader,
    explorer: &'a dyn TransactionExplorer,
}

impl<'a> Registrar<'a> {
    pub fn new(reader: &'a dyn ContractReader, explorer: &'a dyn TransactionExplorer) -> Self {
        Self { reader, explorer }
    }

    /// Build the pool record for `request` and insert it into `document`.
    ///
    /// All chain and explorer reads happen before the document is touched,
    /// so any failure leaves it exactly as it was.
    pub async fn register(
        &self,
        document: &mut MetadataDocument,
        request: &PoolRequest,
    ) -> Result<Registration, RegistrarError> {
        let address = request.address.to_checksum(None);
        if document.contains_pool(&address, request.chain.id()) {
            return Ok(Registration::AlreadyPresent);
        }

        let (onchain, birthblock) = tokio::try_join!(
            async { self.read_pool(request.address).await.map_err(RegistrarError::from) },
            async {
                birth_block(self.explorer, request.address, request.chain)
                    .await
                    .map_err(RegistrarError::from)
            },
        )?;

        let pool = build_pool(request, onchain, birthblock)?;
        document.insert_pool(pool.clone());
        Ok(Registration::Added(pool))
    }

    async fn read_pool(&self, pool: Address) -> Result<OnChainPool, ChainError> {
        let reader = self.reader;
        let (pool_name, version, symbol, decimals, collateral_address) = tokio::try_join!(
            reader.name(pool),
            reader.version(pool),
            reader.symbol(pool),
            reader.decimals(pool),
            reader.underlying_token(pool),
        )?;
        let (collateral_symbol, collateral_decimals) = tokio::try_join!(
            reader.symbol(collateral_address),
            reader.decimals(collateral_address),
        )?;

        Ok(OnChainPool {
            pool_name,
            version,
            symbol,
            decimals,
            collateral_address,
            collateral_symbol,
            collateral_decimals,
        })
    }
}

/// Derive the registry record from on-chain data.
pub fn build_pool(
    request: &PoolRequest,
    onchain: OnChainPool,
    birthblock: u64,
) -> Result<Pool, RegistrarError> {
    let chain = request.chain;
    let name = short_name(&onchain.pool_name).to_string();
    let version = major_version(&onchain.version)?;

    let risky_name = RISKY_PREFIXES.iter().any(|prefix| name.starts_with(prefix));
    let risk_level = if risky_name || !chain.is_primary() {
        ELEVATED_RISK_LEVEL
    } else {
        DEFAULT_RISK_LEVEL
    };
    let pool_type = if name.starts_with(EARN_PREFIX) {
        PoolType::Earn
    } else {
        PoolType::Grow
    };

    let is_wrapped = onchain.collateral_symbol == chain.descriptor().wrapped_symbol;
    let collateral = Collateral {
        address: onchain.collateral_address.to_checksum(None),
        decimals: onchain.collateral_decimals,
        symbol: onchain.collateral_symbol.clone(),
        collateral_type: request.collateral_type,
        is_wrapped_token: is_wrapped.then_some(true),
        pool_id: request.pool_id.clone(),
    };

    Ok(Pool {
        logo_uri: logo_url(&image_name(&name)),
        name,
        asset: chain.unwrap_asset(&onchain.collateral_symbol).to_string(),
        pool_name: onchain.pool_name,
        address: request.address.to_checksum(None),
        birthblock,
        chain_id: chain.id(),
        risk_level,
        stage: Stage::Alpha,
        version: Some(version),
        symbol: onchain.symbol,
        decimals: onchain.decimals,
        pool_type,
        superseded_by: None,
        collateral: Some(collateral),
        extra: Default::default(),
    })
}

/// First whitespace-delimited token of the on-chain pool name.
pub fn short_name(pool_name: &str) -> &str {
    pool_name.split_whitespace().next().unwrap_or(pool_name)
}

/// Major component of a dotted version string (`"3.0.5"` gives 3).
pub fn major_version(version: &str) -> Result<u32, RegistrarError> {
    version
        .split('.')
        .next()
        .and_then(|major| major.trim().parse().ok())
        .ok_or_else(|| RegistrarError::InvalidVersion(version.to_string()))
}

fn image_name(name: &str) -> String {
    let lower = name.to_lowercase();
    lower.split('.').next().unwrap_or_default().to_string()
}

/// Register a pool against the metadata file at `metadata_path`, using the
/// node and explorer configured for the request's chain. A pool that is
/// already listed needs no node at all. The file is only rewritten when a
/// pool was actually added.
pub async fn add_pool(
    settings: &Settings,
    metadata_path: &Path,
    request: &PoolRequest,
) -> Result<Registration, RegistrarError> {
    let mut file = MetadataFile::load(metadata_path)?;
    if file
        .document
        .contains_pool(&request.address.to_checksum(None), request.chain.id())
    {
        info!("{} on {} is already registered", request.address, request.chain);
        return Ok(Registration::AlreadyPresent);
    }

    let reader = RpcContractReader::connect(settings.node_url(request.chain)?)?;
    let explorer = EtherscanClient::for_chain(request.chain, settings);

    info!("📡 Reading pool {} on {}", request.address, request.chain);
    let outcome = Registrar::new(&reader, &explorer)
        .register(&mut file.document, request)
        .await?;

    if let Registration::Added(pool) = &outcome {
        file.save()?;
        info!("✅ Registered {} (birth block {})", pool.name, pool.birthblock);
    }
    Ok(outcome)
}
