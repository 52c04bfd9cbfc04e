use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::types::MetadataDocument;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} changed on disk since it was loaded; rerun to pick up the other change")]
    ConcurrentModification { path: PathBuf },
}

/// The metadata document together with where it lives and the digest of
/// the bytes it was parsed from.
///
/// `document` is the typed view callers read and edit. The raw JSON it was
/// parsed from is kept alongside so that records the caller left alone are
/// written back exactly as they were found, key order included.
#[derive(Debug)]
pub struct MetadataFile {
    path: PathBuf,
    revision: String,
    raw: Value,
    trailing_newline: bool,
    pub document: MetadataDocument,
}

impl MetadataFile {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let bytes = read_bytes(&path)?;
        let json_error = |source| DocumentError::Json {
            path: path.clone(),
            source,
        };
        let raw: Value = serde_json::from_slice(&bytes).map_err(json_error)?;
        let document = serde_json::from_value(raw.clone()).map_err(json_error)?;
        let revision = revision_of(&bytes);

        debug!("Loaded {} at revision {}", path.display(), &revision[..12]);
        Ok(Self {
            trailing_newline: bytes.ends_with(b"\n"),
            path,
            revision,
            raw,
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Digest of the on-disk bytes this document corresponds to.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Write the document back. Fails without writing when the file was
    /// changed by someone else after [`MetadataFile::load`].
    pub fn save(&mut self) -> Result<(), DocumentError> {
        let current = read_bytes(&self.path)?;
        if revision_of(&current) != self.revision {
            return Err(DocumentError::ConcurrentModification {
                path: self.path.clone(),
            });
        }

        let json_error = |source| DocumentError::Json {
            path: self.path.clone(),
            source,
        };
        let merged = merge_into_raw(&self.raw, &self.document).map_err(json_error)?;
        let mut bytes = serde_json::to_vec_pretty(&merged).map_err(json_error)?;
        if self.trailing_newline {
            bytes.push(b'\n');
        }
        replace_file(&self.path, &bytes)?;

        self.revision = revision_of(&bytes);
        self.raw = merged;
        info!("Saved {}", self.path.display());
        Ok(())
    }
}

/// Lay `document` over the JSON it was loaded from. Top-level keys keep
/// their original position; pools and tokens that still equal a loaded
/// record reuse that record verbatim, everything else is serialized fresh.
fn merge_into_raw(raw: &Value, document: &MetadataDocument) -> Result<Value, serde_json::Error> {
    let fresh = match serde_json::to_value(document)? {
        Value::Object(fresh) => fresh,
        other => return Ok(other),
    };
    let mut merged = match raw {
        Value::Object(original) => original.clone(),
        _ => Map::new(),
    };

    // Unknown top-level keys dropped from the typed view go away here too
    merged.retain(|key, _| fresh.contains_key(key));
    for (key, value) in fresh {
        let value = match key.as_str() {
            "pools" => reuse_records(raw.get("pools"), &document.pools)?,
            "tokens" => reuse_records(raw.get("tokens"), &document.tokens)?,
            _ => value,
        };
        merged.insert(key, value);
    }
    Ok(Value::Object(merged))
}

fn reuse_records<T>(raw: Option<&Value>, records: &[T]) -> Result<Value, serde_json::Error>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let originals: Vec<(T, &Value)> = raw
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let parsed = serde_json::from_value(item.clone()).ok()?;
                    Some((parsed, item))
                })
                .collect()
        })
        .unwrap_or_default();

    records
        .iter()
        .map(|record| match originals.iter().find(|(parsed, _)| parsed == record) {
            Some((_, original)) => Ok((*original).clone()),
            None => serde_json::to_value(record),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Serialize `value` as two-space indented JSON and replace `path` with it.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<Vec<u8>, DocumentError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    replace_file(path, &bytes)?;
    Ok(bytes)
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), DocumentError> {
    let mut tmp_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|source| DocumentError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, DocumentError> {
    fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn revision_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
