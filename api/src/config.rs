//! Node and explorer configuration.
//!
//! Settings are resolved from in-code defaults, then an optional JSON file
//! named by `TANGLE_CONFIG` (native targets only), then individual
//! environment variables.

use std::env;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::network::Network;

/// Default cap on the number of hashes listed for an address, tag or bundle.
pub const DEFAULT_MAX_LISTED_HASHES: usize = 250;

const DEFAULT_CACHE_TTL_SECS: u64 = 60;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DEPTH: u32 = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single node endpoint and the attach parameters it expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfiguration {
    /// The provider url for ledger communication.
    pub provider: String,
    /// Depth for attaches.
    pub depth: u32,
    /// Minimum weight magnitude for attaches.
    pub mwm: u8,
}

impl NodeConfiguration {
    pub fn new(provider: impl Into<String>, depth: u32, mwm: u8) -> Self {
        Self {
            provider: provider.into(),
            depth,
            mwm,
        }
    }
}

/// The nodes used for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfiguration {
    pub network: Network,
    pub nodes: Vec<NodeConfiguration>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl NetworkConfiguration {
    pub fn default_for(network: Network) -> Self {
        let nodes = match network {
            Network::Mainnet => vec![
                NodeConfiguration::new("https://nodes.iota.org:443", DEFAULT_DEPTH, 14),
                NodeConfiguration::new("https://nodes.thetangle.org:443", DEFAULT_DEPTH, 14),
            ],
            Network::Devnet => vec![NodeConfiguration::new(
                "https://nodes.devnet.iota.org:443",
                DEFAULT_DEPTH,
                9,
            )],
        };
        Self {
            network,
            nodes,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Replaces the node list with `urls`, keeping the depth and mwm of the
    /// first configured node.
    fn with_providers(mut self, urls: &str) -> Self {
        let template = self
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| NodeConfiguration::new("", DEFAULT_DEPTH, 14));
        let nodes: Vec<_> = urls
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| NodeConfiguration::new(url, template.depth, template.mwm))
            .collect();
        if !nodes.is_empty() {
            self.nodes = nodes;
        }
        self
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_listed_hashes() -> usize {
    DEFAULT_MAX_LISTED_HASHES
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

/// Everything the explorer needs to know about its environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub mainnet: NetworkConfiguration,
    pub devnet: NetworkConfiguration,
    #[serde(default = "default_max_listed_hashes")]
    pub max_listed_hashes: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mainnet: NetworkConfiguration::default_for(Network::Mainnet),
            devnet: NetworkConfiguration::default_for(Network::Devnet),
            max_listed_hashes: DEFAULT_MAX_LISTED_HASHES,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn network(&self, network: Network) -> &NetworkConfiguration {
        match network {
            Network::Mainnet => &self.mainnet,
            Network::Devnet => &self.devnet,
        }
    }

    /// Loads the configuration for this process.
    ///
    /// # Environment Variables
    /// - `TANGLE_CONFIG`: path to a JSON config file (native only).
    /// - `TANGLE_MAINNET_NODES` / `TANGLE_DEVNET_NODES`: comma separated
    ///   node urls.
    /// - `TANGLE_MAX_LISTED`: cap on listed hashes.
    /// - `TANGLE_CACHE_TTL_SECS`: tangle cache lifetime.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env::var("TANGLE_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        Ok(base.with_overrides(|key| env::var(key).ok()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        dioxus_logger::tracing::info!("loaded config from {}", path);
        Self::from_json(&json)
    }

    #[cfg(target_arch = "wasm32")]
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        dioxus_logger::tracing::warn!("config file {} ignored in the browser", path);
        Ok(Self::default())
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(urls) = lookup("TANGLE_MAINNET_NODES") {
            self.mainnet = self.mainnet.with_providers(&urls);
        }
        if let Some(urls) = lookup("TANGLE_DEVNET_NODES") {
            self.devnet = self.devnet.with_providers(&urls);
        }
        if let Some(max) = lookup("TANGLE_MAX_LISTED").and_then(|v| v.parse().ok()) {
            self.max_listed_hashes = max;
        }
        if let Some(ttl) = lookup("TANGLE_CACHE_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.cache_ttl_secs = ttl;
        }
        self
    }
}
