//! Curation tooling for the Vesper pool metadata registry.
//!
//! The registry is a single JSON document listing pools and plain tokens
//! across several EVM chains. This crate registers new pools from on-chain
//! and block-explorer data, keeps the document version in sync with the
//! package descriptor, projects the registry into a token list and validates
//! the registry against its naming conventions and the chain itself.

pub mod chains;
pub mod config;
pub mod document;
pub mod explorer;
pub mod onchain;
pub mod registrar;
pub mod token_list;
pub mod types;
pub mod validate;
pub mod version_sync;

pub use chains::{Chain, ChainDescriptor};
pub use config::{ConfigError, Settings};
pub use document::{DocumentError, MetadataFile};
pub use registrar::{PoolRequest, Registrar, RegistrarError, Registration};
pub use types::{Collateral, CollateralType, MetadataDocument, Pool, PoolType, Stage, Token};
