use std::collections::HashMap;
use std::env;

use thiserror::Error;
use tracing::{debug, info};

use crate::chains::Chain;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported chain {0}")]
    UnsupportedChain(u64),
    #[error("Missing node URL for chain {chain_id} (set {env_var})")]
    MissingNodeUrl {
        chain_id: u64,
        env_var: &'static str,
    },
}

/// Endpoint and credential configuration, resolved once at startup and
/// handed to every collaborator that needs it.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    node_urls: HashMap<Chain, String>,
    pub explorer_api_key: Option<String>,
}

impl Settings {
    /// Read node URLs and the optional explorer API key from the environment.
    /// Unset or empty variables leave the chain unconfigured.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        for chain in Chain::all() {
            let env_var = chain.descriptor().node_url_env;
            match env::var(env_var) {
                Ok(url) if !url.trim().is_empty() => {
                    debug!("Loaded node URL for {}", chain);
                    settings.node_urls.insert(chain, url.trim().to_string());
                }
                _ => debug!("No node URL for {} ({} unset)", chain, env_var),
            }
        }

        if let Ok(key) = env::var("EXPLORER_API_KEY") {
            if !key.is_empty() {
                settings.explorer_api_key = Some(key);
            }
        }

        info!("Node URLs configured for {} chain(s)", settings.node_urls.len());
        settings
    }

    pub fn with_node_url(mut self, chain: Chain, url: impl Into<String>) -> Self {
        self.node_urls.insert(chain, url.into());
        self
    }

    pub fn node_url(&self, chain: Chain) -> Result<&str, ConfigError> {
        self.node_urls
            .get(&chain)
            .map(String::as_str)
            .ok_or(ConfigError::MissingNodeUrl {
                chain_id: chain.id(),
                env_var: chain.descriptor().node_url_env,
            })
    }

    pub fn configured_chains(&self) -> Vec<Chain> {
        Chain::all().filter(|chain| self.node_urls.contains_key(chain)).collect()
    }
}
