//! Projection of the registry into a Uniswap-style token list.
//! See https://uniswap.org/blog/token-lists/ for the format.

use std::cmp::Ordering;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::document::{write_json, DocumentError, MetadataFile};
use crate::types::{MetadataDocument, Pool, Stage, Token, GOVERNANCE_SYMBOL};
use crate::version_sync::{read_package_version, VersionSyncError};

pub const TOKEN_LIST_NAME: &str = "Vesper Tokens";

#[derive(Debug, Error)]
pub enum TokenListError {
    #[error("Governance token {0} not found in the token list")]
    MissingGovernanceToken(&'static str),
    #[error("Version '{0}' is not of the form major.minor.patch")]
    InvalidVersion(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Package(#[from] VersionSyncError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenList {
    pub name: String,
    pub timestamp: String,
    pub version: ListVersion,
    pub tokens: Vec<TokenListEntry>,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl FromStr for ListVersion {
    type Err = TokenListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TokenListError::InvalidVersion(s.to_string());
        let parts = s
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenListEntry {
    pub address: String,
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

fn tags_for(item_type: Option<&str>, stage: Option<Stage>) -> Option<Vec<String>> {
    let mut tags = Vec::new();
    if let Some(item_type) = item_type {
        tags.push("pool".to_string());
        tags.push(item_type.to_string());
    }
    if stage == Some(Stage::Retired) {
        tags.push("retired".to_string());
    }
    (!tags.is_empty()).then_some(tags)
}

impl From<&Pool> for TokenListEntry {
    fn from(pool: &Pool) -> Self {
        Self {
            address: pool.address.clone(),
            chain_id: pool.chain_id,
            decimals: pool.decimals,
            logo_uri: pool.logo_uri.clone(),
            name: pool.pool_name.clone(),
            symbol: pool.symbol.clone(),
            tags: tags_for(Some(pool.pool_type.as_str()), Some(pool.stage)),
        }
    }
}

impl From<&Token> for TokenListEntry {
    fn from(token: &Token) -> Self {
        Self {
            address: token.address.clone(),
            chain_id: token.chain_id,
            decimals: token.decimals,
            logo_uri: token.logo_uri.clone(),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            tags: tags_for(token.token_type.as_deref(), token.stage),
        }
    }
}

/// Case-insensitive ordering that puts lower case first on ties, close to
/// what a default locale collation does for the ASCII names in the registry.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Build the token list for `document`, published as `version` and stamped
/// with `timestamp`.
pub fn project(
    document: &MetadataDocument,
    version: &str,
    timestamp: DateTime<Utc>,
) -> Result<TokenList, TokenListError> {
    let version = version.parse::<ListVersion>()?;
    let logo_uri = document
        .governance_token()
        .map(|token| token.logo_uri.clone())
        .ok_or(TokenListError::MissingGovernanceToken(GOVERNANCE_SYMBOL))?;

    let mut tokens: Vec<TokenListEntry> = document
        .pools
        .iter()
        .map(TokenListEntry::from)
        .chain(document.tokens.iter().map(TokenListEntry::from))
        .collect();
    tokens.sort_by(|a, b| locale_cmp(&a.name, &b.name));

    Ok(TokenList {
        name: TOKEN_LIST_NAME.to_string(),
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        version,
        tokens,
        logo_uri,
    })
}

/// Write the token list of the metadata document to `output_path`. The
/// list carries the package version, not the document's own.
pub fn write_token_list(
    metadata_path: &Path,
    package_path: &Path,
    output_path: &Path,
) -> Result<TokenList, TokenListError> {
    let version = read_package_version(package_path)?;
    let file = MetadataFile::load(metadata_path)?;
    let list = project(&file.document, &version, Utc::now())?;
    write_json(output_path, &list)?;
    info!("Wrote {} tokens to {}", list.tokens.len(), output_path.display());
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;
    use crate::types::PoolType;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_version_parsing_is_strict() {
        assert_eq!(
            "4.2.10".parse::<ListVersion>().unwrap(),
            ListVersion {
                major: 4,
                minor: 2,
                patch: 10
            }
        );
        assert!("4.2".parse::<ListVersion>().is_err());
        assert!("4.2.0.1".parse::<ListVersion>().is_err());
        assert!("4.2.0-beta".parse::<ListVersion>().is_err());
    }

    #[test]
    fn test_tags() {
        assert_eq!(tags_for(None, None), None);
        assert_eq!(
            tags_for(Some("grow"), Some(Stage::Prod)),
            Some(vec!["pool".to_string(), "grow".to_string()])
        );
        assert_eq!(
            tags_for(Some("grow"), Some(Stage::Retired)),
            Some(vec!["pool".to_string(), "grow".to_string(), "retired".to_string()])
        );
        assert_eq!(tags_for(None, Some(Stage::Retired)), Some(vec!["retired".to_string()]));
    }

    #[test]
    fn test_projection_uses_pool_name_and_sorts() {
        let mut earn =
            fixtures::pool("veETH-DAI", "0x0000000000000000000000000000000000000002", 1, 5);
        earn.pool_name = "veETH-DAI Earn Pool".to_string();
        earn.pool_type = PoolType::Earn;
        let grow = fixtures::pool("vaUSDC", "0x0000000000000000000000000000000000000001", 1, 9);

        let list = project(&fixtures::document(vec![earn, grow]), "4.2.0", at()).unwrap();

        let names: Vec<&str> = list.tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["vaUSDC Pool", "veETH-DAI Earn Pool", "Vesper"]);
        assert_eq!(list.timestamp, "2024-03-01T12:00:00.000Z");
        assert_eq!(
            list.version,
            ListVersion {
                major: 4,
                minor: 2,
                patch: 0
            }
        );
        assert_eq!(list.logo_uri, fixtures::vsp_token().logo_uri);
        assert_eq!(list.tokens[2].tags, None);
    }

    #[test]
    fn test_list_version_comes_from_argument() {
        let doc = fixtures::document(vec![]);
        let list = project(&doc, "5.0.1", at()).unwrap();
        assert_eq!(
            list.version,
            ListVersion {
                major: 5,
                minor: 0,
                patch: 1
            }
        );
        assert!(matches!(
            project(&doc, "5.0", at()),
            Err(TokenListError::InvalidVersion(v)) if v == "5.0"
        ));
    }

    #[test]
    fn test_missing_governance_token() {
        let mut doc = fixtures::document(vec![]);
        doc.tokens.clear();
        assert!(matches!(
            project(&doc, "4.2.0", at()),
            Err(TokenListError::MissingGovernanceToken("VSP"))
        ));
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(locale_cmp("vETH", "VETH"), Ordering::Less);
        assert_eq!(locale_cmp("Vesper", "vaETH"), Ordering::Greater);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_entries_omit_empty_tags_when_serialized() {
        let entry = TokenListEntry::from(&fixtures::vsp_token());
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("tags").is_none());
        assert_eq!(value["logoURI"], fixtures::vsp_token().logo_uri);
    }
}
