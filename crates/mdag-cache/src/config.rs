use serde::{Deserialize, Serialize};

/// Size limits for a [`NodeCache`](crate::NodeCache).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Byte budget across all cached nodes.
    pub total_size_limit: u64,
    /// Largest single node the cache will hold. `None` means only the total
    /// budget applies.
    pub node_size_limit: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            total_size_limit: 32 * 1024 * 1024,
            node_size_limit: Some(1024 * 1024),
        }
    }
}

impl CacheConfig {
    /// A config with the given total budget and no per-node limit.
    pub fn with_total_limit(total_size_limit: u64) -> Self {
        Self {
            total_size_limit,
            node_size_limit: None,
        }
    }
}
