use std::path::{Path, PathBuf};
use std::process::ExitCode;

use alloy::primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vesper_metadata::{
    registrar::{self, PoolRequest, Registration},
    token_list, validate, version_sync, Chain, CollateralType, MetadataFile, Settings,
};

#[derive(Parser)]
#[command(name = "vesper-metadata")]
#[command(about = "Maintain the Vesper pool metadata registry")]
#[command(version)]
struct Cli {
    /// Path to the metadata document
    #[arg(long, global = true, default_value = "src/vesper-metadata.json")]
    metadata: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a pool from its contract and block-explorer data
    AddPool {
        /// Pool contract address
        address: Address,

        /// Chain the pool lives on
        #[arg(default_value_t = 1)]
        chain_id: u64,

        /// How the collateral token accrues value: normal, rebasing or compounding
        #[arg(long, default_value = "normal")]
        collateral_type: CollateralType,

        /// Id of the external pool the collateral comes from
        #[arg(long)]
        pool_id: Option<String>,
    },
    /// Copy the package version into the metadata document
    SyncVersion {
        #[arg(long, default_value = "package.json")]
        package: PathBuf,
    },
    /// Write the token list derived from the metadata document
    TokenList {
        /// Package descriptor whose version the list is published under
        #[arg(long, default_value = "package.json")]
        package: PathBuf,

        #[arg(long, default_value = "src/vesper.tokenlist.json")]
        output: PathBuf,
    },
    /// Check the registry against its conventions
    Validate {
        #[arg(long, default_value = "src/logos")]
        logos: PathBuf,

        /// Also compare every pool with its contract
        #[arg(long)]
        on_chain: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match run(cli, &settings).await {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute one subcommand and return the confirmation for the operator.
async fn run(cli: Cli, settings: &Settings) -> Result<String> {
    match cli.command {
        Commands::AddPool {
            address,
            chain_id,
            collateral_type,
            pool_id,
        } => {
            let request = PoolRequest {
                address,
                chain: Chain::from_id(chain_id).context("Failed adding pool")?,
                collateral_type,
                pool_id,
            };
            add_pool(settings, &cli.metadata, &request)
                .await
                .context("Failed adding pool")
        }
        Commands::SyncVersion { package } => {
            let version = version_sync::sync_version(&cli.metadata, &package)
                .context("Failed syncing version")?;
            Ok(format!("Metadata version set to {}", version))
        }
        Commands::TokenList { package, output } => {
            let list = token_list::write_token_list(&cli.metadata, &package, &output)
                .context("Failed creating token list")?;
            Ok(format!("{} tokens written to {}", list.tokens.len(), output.display()))
        }
        Commands::Validate { logos, on_chain } => {
            validate_registry(settings, &cli.metadata, &logos, on_chain)
                .await
                .context("Validation failed")
        }
    }
}

async fn add_pool(settings: &Settings, metadata: &Path, request: &PoolRequest) -> Result<String> {
    let message = match registrar::add_pool(settings, metadata, request).await? {
        Registration::Added(pool) => format!("{} added!", pool.name),
        Registration::AlreadyPresent => "Pool already added".to_string(),
    };
    Ok(message)
}

async fn validate_registry(
    settings: &Settings,
    metadata: &Path,
    logos: &Path,
    on_chain: bool,
) -> Result<String> {
    let file = MetadataFile::load(metadata)?;
    let mut issues = validate::validate_document(&file.document, logos);
    if on_chain {
        issues.extend(validate::verify_on_chain(&file.document, settings).await);
    }

    for issue in &issues {
        println!("{}", issue);
    }
    if !issues.is_empty() {
        bail!("{} issue(s) found in {} pool(s)", issues.len(), file.document.pools.len());
    }

    info!("✅ {} pools validated", file.document.pools.len());
    Ok(format!("All {} pools valid", file.document.pools.len()))
}
