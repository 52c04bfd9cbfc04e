use std::collections::HashMap;
use std::str::FromStr;

use alloy::primitives::Address;
use futures::future::join_all;
use tracing::{info, warn};

use super::{Check, Issue};
use crate::chains::Chain;
use crate::config::Settings;
use crate::onchain::{ChainError, ContractReader, RpcContractReader};
use crate::types::{MetadataDocument, Pool};

/// Contract name a pool should report, derived from its registry name:
/// `vETH` → `vETH Pool`, `veETH-DAI` → `veETH-DAI Earn Pool`,
/// `vUSDC-v3` → `vUSDC Pool`.
pub fn expected_contract_name(name: &str) -> String {
    let earn = if name.starts_with("ve") { "Earn " } else { "" };
    let pool_word = if name == "vVSP" { "pool" } else { "Pool" };
    format!("{} {}{}", strip_version_suffix(name), earn, pool_word)
}

fn strip_version_suffix(name: &str) -> &str {
    match name.rfind("-v") {
        Some(idx) => {
            let digits = &name[idx + 2..];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                &name[..idx]
            } else {
                name
            }
        }
        None => name,
    }
}

fn mismatch(
    pool: &Pool,
    field: &str,
    expected: impl std::fmt::Display,
    actual: impl std::fmt::Display,
) -> Issue {
    Issue::new(
        pool,
        Check::OnChain,
        format!("{} is {} on chain, registry expects {}", field, actual, expected),
    )
}

fn failed(pool: &Pool, err: &ChainError) -> Issue {
    Issue::new(pool, Check::OnChain, err.to_string())
}

/// Compare one pool against its contract. Every call is issued; failures
/// become issues instead of aborting the check.
pub async fn verify_pool(pool: &Pool, reader: &dyn ContractReader) -> Vec<Issue> {
    let address = match Address::from_str(&pool.address) {
        Ok(address) => address,
        Err(e) => {
            let message = format!("unparseable address: {}", e);
            return vec![Issue::new(pool, Check::OnChain, message)];
        }
    };
    let chain = match Chain::from_id(pool.chain_id) {
        Ok(chain) => chain,
        Err(e) => return vec![Issue::new(pool, Check::OnChain, e.to_string())],
    };

    let collateral_symbol = async {
        let token = reader.underlying_token(address).await?;
        reader.symbol(token).await
    };
    let (name, version, symbol, decimals, collateral_symbol) = tokio::join!(
        reader.name(address),
        reader.version(address),
        reader.symbol(address),
        reader.decimals(address),
        collateral_symbol,
    );

    let mut issues = Vec::new();

    match name {
        Ok(name) => {
            let expected = expected_contract_name(&pool.name);
            if name != expected {
                issues.push(mismatch(pool, "name()", &expected, &name));
            }
            if name != pool.pool_name {
                issues.push(mismatch(pool, "name()", &pool.pool_name, &name));
            }
        }
        Err(e) => issues.push(failed(pool, &e)),
    }

    match collateral_symbol {
        Ok(actual) => {
            let expected = chain.wrap_asset(&pool.asset);
            if actual != expected {
                issues.push(mismatch(pool, "collateral symbol()", expected, &actual));
            }
        }
        Err(e) => issues.push(failed(pool, &e)),
    }

    // Pools deployed before VERSION() existed revert; they count as v1
    let major = match version {
        Ok(version) => Ok(version.split('.').next().unwrap_or_default().to_string()),
        Err(e) if e.is_revert() => Ok("1".to_string()),
        Err(e) => Err(e),
    };
    match major {
        Ok(major) => {
            let expected = pool.version.unwrap_or(1).to_string();
            if major != expected {
                issues.push(mismatch(pool, "VERSION() major", &expected, &major));
            }
        }
        Err(e) => issues.push(failed(pool, &e)),
    }

    match symbol {
        Ok(symbol) if symbol != pool.symbol => {
            issues.push(mismatch(pool, "symbol()", &pool.symbol, &symbol))
        }
        Ok(_) => {}
        Err(e) => issues.push(failed(pool, &e)),
    }

    match decimals {
        Ok(decimals) if decimals != pool.decimals => {
            issues.push(mismatch(pool, "decimals()", pool.decimals, decimals))
        }
        Ok(_) => {}
        Err(e) => issues.push(failed(pool, &e)),
    }

    issues
}

/// Verify every pool against its chain using the configured nodes. Pools on
/// chains without a usable node are reported rather than skipped silently.
pub async fn verify_on_chain(document: &MetadataDocument, settings: &Settings) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut readers: HashMap<Chain, RpcContractReader> = HashMap::new();
    let mut checkable = Vec::new();

    for pool in &document.pools {
        let chain = match Chain::from_id(pool.chain_id) {
            Ok(chain) => chain,
            Err(e) => {
                issues.push(Issue::new(pool, Check::OnChain, e.to_string()));
                continue;
            }
        };

        if !readers.contains_key(&chain) {
            let reader = settings
                .node_url(chain)
                .map_err(|e| e.to_string())
                .and_then(|url| RpcContractReader::connect(url).map_err(|e| e.to_string()));
            match reader {
                Ok(reader) => {
                    readers.insert(chain, reader);
                }
                Err(reason) => {
                    warn!("Cannot verify {} on {}: {}", pool.name, chain, reason);
                    issues.push(Issue::new(pool, Check::OnChain, reason));
                    continue;
                }
            }
        }
        checkable.push((pool, chain));
    }

    info!("Verifying {} pool(s) on chain", checkable.len());
    let results = join_all(
        checkable
            .iter()
            .map(|(pool, chain)| verify_pool(pool, &readers[chain])),
    )
    .await;

    issues.extend(results.into_iter().flatten());
    issues
}
