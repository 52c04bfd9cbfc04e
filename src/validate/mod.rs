//! Consistency checks over the registry.
//!
//! Offline checks look only at the document and the logos directory;
//! on-chain checks compare each pool against its contract.

pub mod conventions;
pub mod onchain;

pub use onchain::{verify_on_chain, verify_pool};

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::types::{MetadataDocument, Pool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Structure,
    Uniqueness,
    Logo,
    Naming,
    Symbol,
    OnChain,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Check::Structure => "structure",
            Check::Uniqueness => "uniqueness",
            Check::Logo => "logo",
            Check::Naming => "naming",
            Check::Symbol => "symbol",
            Check::OnChain => "on-chain",
        };
        f.write_str(label)
    }
}

/// One failed check for one pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub pool: String,
    pub address: String,
    pub chain_id: u64,
    pub check: Check,
    pub message: String,
}

impl Issue {
    pub fn new(pool: &Pool, check: Check, message: impl Into<String>) -> Self {
        Self {
            pool: pool.name.clone(),
            address: pool.address.clone(),
            chain_id: pool.chain_id,
            check,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({} on chain {}): {}",
            self.check, self.pool, self.address, self.chain_id, self.message
        )
    }
}

/// Run every offline check over the document.
pub fn validate_document(document: &MetadataDocument, logos_dir: &Path) -> Vec<Issue> {
    let mut issues = duplicate_pools(document);
    for pool in &document.pools {
        issues.extend(conventions::check_structure(pool));
        issues.extend(conventions::check_logo(pool, logos_dir));
        issues.extend(conventions::check_naming(pool));
        issues.extend(conventions::check_symbol(pool));
    }
    issues
}

fn duplicate_pools(document: &MetadataDocument) -> Vec<Issue> {
    let mut seen = HashSet::new();
    document
        .pools
        .iter()
        .filter(|pool| !seen.insert((pool.address.to_lowercase(), pool.chain_id)))
        .map(|pool| {
            Issue::new(pool, Check::Uniqueness, "address registered more than once on this chain")
        })
        .collect()
}
