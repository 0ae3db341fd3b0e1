//! A process-wide cache cell.
//!
//! [`SharedNodeCache`] holds the current [`NodeCache`] value behind an
//! [`ArcSwap`]. Readers load a snapshot without blocking. Writers apply one of
//! the pure cache transitions with read-copy-update: load the current value,
//! compute the next one, install it if nobody else got there first, and
//! otherwise retry against the value that won.

use std::sync::Arc;

use arc_swap::ArcSwap;
use mdag_types::{Node, NodeId};
use tracing::debug;

use crate::cache::NodeCache;
use crate::config::CacheConfig;

/// Shared, atomically updated [`NodeCache`].
///
/// Cloning is cheap and every clone sees the same cache.
#[derive(Clone)]
pub struct SharedNodeCache {
    cell: Arc<ArcSwap<NodeCache>>,
}

impl SharedNodeCache {
    /// An empty shared cache with the given limits.
    pub fn new(config: CacheConfig) -> Self {
        Self::from_cache(NodeCache::new(config))
    }

    /// Share an existing cache value.
    pub fn from_cache(cache: NodeCache) -> Self {
        Self {
            cell: Arc::new(ArcSwap::from_pointee(cache)),
        }
    }

    /// The current cache value.
    pub fn snapshot(&self) -> Arc<NodeCache> {
        self.cell.load_full()
    }

    /// Apply `transition` with compare-and-retry and return the value it
    /// replaced. `transition` may run more than once under contention.
    pub fn update<F>(&self, mut transition: F) -> Arc<NodeCache>
    where
        F: FnMut(&NodeCache) -> NodeCache,
    {
        self.cell.rcu(|current| transition(current))
    }

    /// Look up `id`, recording a hit if it is cached.
    pub fn lookup(&self, id: &NodeId) -> Option<Node> {
        let node = self.cell.load().lookup_shared(id)?;
        // Not atomic with the read. If `id` is evicted in between, the hit
        // only advances the clock.
        self.update(|cache| cache.hit(id));
        Some(Node::clone(&node))
    }

    /// Returns `true` if `id` is currently cached.
    pub fn has(&self, id: &NodeId) -> bool {
        self.cell.load().has(id)
    }

    /// Record a use of `id`.
    pub fn hit(&self, id: &NodeId) {
        self.update(|cache| cache.hit(id));
    }

    /// Offer a freshly fetched node to the cache.
    pub fn miss(&self, id: &NodeId, node: &Node) {
        let mut evicted = 0;
        let mut total_size = 0;
        self.update(|cache| {
            let next = cache.miss(id, node);
            evicted = if next.has(id) {
                (cache.len() + usize::from(!cache.has(id))).saturating_sub(next.len())
            } else {
                0
            };
            total_size = next.total_size();
            next
        });
        if evicted > 0 {
            debug!(
                node = %id.short_hex(),
                evicted,
                total_size,
                "cache reaped to make room"
            );
        }
    }

    /// Drop `id` from the cache.
    pub fn evict(&self, id: &NodeId) {
        self.update(|cache| cache.evict(id));
    }

    /// Replace the cache contents with `base`.
    pub fn seed<I>(&self, base: I)
    where
        I: IntoIterator<Item = (NodeId, Node)>,
    {
        let base: Vec<(NodeId, Node)> = base.into_iter().collect();
        let count = base.len();
        self.update(|cache| cache.seed(base.iter().cloned()));
        debug!(entries = count, "cache seeded");
    }
}

impl std::fmt::Debug for SharedNodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cell.load();
        f.debug_struct("SharedNodeCache")
            .field("entries", &cache.len())
            .field("total_size", &cache.total_size())
            .field("tick", &cache.tick())
            .finish()
    }
}
