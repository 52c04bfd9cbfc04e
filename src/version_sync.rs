use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::document::{DocumentError, MetadataFile};

#[derive(Debug, Error)]
pub enum VersionSyncError {
    #[error("Failed to read package descriptor {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid package descriptor {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

#[derive(Debug, Deserialize)]
struct PackageDescriptor {
    version: String,
}

pub fn read_package_version(path: &Path) -> Result<String, VersionSyncError> {
    let content = fs::read_to_string(path).map_err(|source| VersionSyncError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let descriptor: PackageDescriptor =
        serde_json::from_str(&content).map_err(|source| VersionSyncError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(descriptor.version)
}

/// Copy the package version into the metadata document and persist it.
/// Returns the version written.
pub fn sync_version(metadata_path: &Path, package_path: &Path) -> Result<String, VersionSyncError> {
    let version = read_package_version(package_path)?;
    let mut file = MetadataFile::load(metadata_path)?;

    if file.document.version != version {
        info!("Updating metadata version {} -> {}", file.document.version, version);
    }
    file.document.version = version.clone();
    file.save()?;
    Ok(version)
}
