use std::path::Path;

use alloy::primitives::Address;

use super::{Check, Issue};
use crate::types::{logo_url, Pool, PoolType, Stage};

/// Pools whose name predates the name == symbol rule.
const NAMING_EXEMPT: [&str; 2] = [
    "0x777A7850251b7A301cfA1E7b1d8a9c4a9C49Cf85", // vUSDC-v3
    "0xB1C0d6EFD3bAb0FC3CA648a12C15d0827e3bcde5", // vUSDC-v2
];

/// Pools with historical symbols that do not follow the asset-derived form.
const SYMBOL_EXEMPT: [&str; 8] = [
    "0x1e86044468b92c310800d4B350E0F83387a7097F", // vBetaUSDC
    "0x2C361913e2dA663e1898162Ec01497C46eb87AbF", // vBetaETH
    "0x74Cc5BC20B0c396dF5680eE4aeB6169A6288a8aF", // vBetaWBTC
    "0x8b3C8626cbfaA71d44bd76C1304214f4858E3639", // vDAI aggressive
    "0xd773cA264b5363F25F7f96319076753849Af168B", // vBTC
    "0xdd63ae655b388Cd782681b7821Be37fdB6d0E78d", // vawstETH
    "0x46fb68Eb2b1Fc43654AbaE5691D39D18D933E4b4", // Base vawstETH
    "0x3899a6090c5C178dB8A1800DA39daD0D06EeEFBE", // Base vacbETH
];

const POLYGON_CHAIN_ID: u64 = 137;

fn is_checksummed(address: &str) -> bool {
    Address::parse_checksummed(address, None).is_ok()
}

pub fn check_structure(pool: &Pool) -> Vec<Issue> {
    let mut issues = Vec::new();

    if pool.name.is_empty() {
        issues.push(Issue::new(pool, Check::Structure, "empty name"));
    }
    if !is_checksummed(&pool.address) {
        issues.push(Issue::new(pool, Check::Structure, "address is not checksummed"));
    }
    if let Some(successor) = &pool.superseded_by {
        if !is_checksummed(successor) {
            issues.push(Issue::new(
                pool,
                Check::Structure,
                format!("supersededBy {} is not checksummed", successor),
            ));
        }
    }
    if !(1..=5).contains(&pool.risk_level) {
        issues.push(Issue::new(
            pool,
            Check::Structure,
            format!("riskLevel {} outside 1..=5", pool.risk_level),
        ));
    }
    if let Some(collateral) = &pool.collateral {
        if !is_checksummed(&collateral.address) {
            issues.push(Issue::new(
                pool,
                Check::Structure,
                "collateral address is not checksummed",
            ));
        }
    }

    issues
}

/// Logo file name (no extension) expected for a pool symbol.
pub fn logo_file_name(symbol: &str) -> String {
    let lower = symbol.to_lowercase().replacen("beta", "", 1);
    lower.split('.').next().unwrap_or_default().to_string()
}

/// Active pools must point at the logo named after their symbol, and the
/// file must exist in the logos directory.
pub fn check_logo(pool: &Pool, logos_dir: &Path) -> Vec<Issue> {
    if pool.stage == Stage::Retired {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let file_name = logo_file_name(&pool.symbol);
    let expected = logo_url(&file_name);
    if pool.logo_uri != expected {
        issues.push(Issue::new(
            pool,
            Check::Logo,
            format!("logoURI {} should be {}", pool.logo_uri, expected),
        ));
    }

    let file = logos_dir.join(format!("{}.svg", file_name));
    if !file.is_file() {
        issues.push(Issue::new(pool, Check::Logo, format!("missing logo file {}", file.display())));
    }
    issues
}

pub fn check_naming(pool: &Pool) -> Vec<Issue> {
    if NAMING_EXEMPT.contains(&pool.address.as_str()) || pool.name == pool.symbol {
        return Vec::new();
    }
    vec![Issue::new(
        pool,
        Check::Naming,
        format!("name {} differs from symbol {}", pool.name, pool.symbol),
    )]
}

/// Expected symbol for a grow pool. Aggressive pools outside Polygon use
/// the `va` prefix with the first segment of the asset upper-cased.
fn expected_grow_symbol(pool: &Pool) -> String {
    if pool.risk_level >= 4 && pool.chain_id != POLYGON_CHAIN_ID {
        let mut segments: Vec<String> = pool.asset.split('.').map(str::to_string).collect();
        if let Some(first) = segments.first_mut() {
            *first = first.to_uppercase();
        }
        format!("va{}", segments.join("."))
    } else {
        format!("v{}", pool.asset)
    }
}

fn is_earn_symbol(symbol: &str, asset: &str) -> bool {
    symbol
        .strip_prefix(&format!("ve{}-", asset))
        .map(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_uppercase()))
        .unwrap_or(false)
}

pub fn check_symbol(pool: &Pool) -> Vec<Issue> {
    if SYMBOL_EXEMPT.contains(&pool.address.as_str()) {
        return Vec::new();
    }

    match pool.pool_type {
        PoolType::Grow => {
            let expected = expected_grow_symbol(pool);
            if pool.symbol != expected {
                return vec![Issue::new(
                    pool,
                    Check::Symbol,
                    format!("symbol {} should be {}", pool.symbol, expected),
                )];
            }
        }
        PoolType::Earn => {
            if !is_earn_symbol(&pool.symbol, &pool.asset) {
                return vec![Issue::new(
                    pool,
                    Check::Symbol,
                    format!("symbol {} should look like ve{}-<REWARD>", pool.symbol, pool.asset),
                )];
            }
        }
        _ => {}
    }
    Vec::new()
}
