use std::path::Path;

use mdag_cache::CacheConfig;
use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};

/// Configuration for a block-backed node store.
///
/// Loaded from TOML:
///
/// ```toml
/// verify_reads = true
///
/// [cache]
/// total_size_limit = 8388608
/// node_size_limit = 65536
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Node cache limits. `None` disables caching.
    pub cache: Option<CacheConfig>,
    /// Recompute each block's hash when it is fetched.
    pub verify_reads: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache: Some(CacheConfig::default()),
            verify_reads: false,
        }
    }
}

impl StoreConfig {
    /// A configuration with caching turned off.
    pub fn uncached() -> Self {
        Self {
            cache: None,
            ..Default::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> NodeResult<Self> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> NodeResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
