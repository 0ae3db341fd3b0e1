//! The collaborator that turns node operations into block operations.

use mdag_cache::SharedNodeCache;
use mdag_store::{Block, BlockStore, StoreError};
use mdag_types::{Link, Node, NodeData, NodeId};
use tracing::{debug, warn};

use crate::codec::{JsonCodec, NodeCodec};
use crate::config::StoreConfig;
use crate::error::NodeResult;

/// Durable node storage as seen by [`NodeStore`](crate::NodeStore).
///
/// Implementations must encode deterministically: identical `(links, data)`
/// must always produce the same node id.
pub trait NodeBackend: Send + Sync {
    /// Fetch and decode a stored node. `Ok(None)` if it does not exist.
    fn fetch_by_id(&self, id: &NodeId) -> NodeResult<Option<Node>>;

    /// Encode `(links, data)`, persist the bytes, and return the new node.
    fn encode_and_store(&self, links: &[Link], data: Option<&NodeData>) -> NodeResult<Node>;

    /// Delete a stored node. Returns `true` if it existed.
    fn delete_by_id(&self, id: &NodeId) -> NodeResult<bool>;
}

/// [`NodeBackend`] over a block store and a codec, with an optional cache.
///
/// Reads consult the cache first. A cache hit records the use; a miss
/// decodes the block and offers the node to the cache, which decides
/// whether it is small enough to keep. Deletes evict before removing the
/// block.
pub struct BlockBackend<B, C = JsonCodec> {
    blocks: B,
    codec: C,
    cache: Option<SharedNodeCache>,
    verify_reads: bool,
}

impl<B: BlockStore> BlockBackend<B, JsonCodec> {
    /// A JSON-encoding backend built from `config`.
    pub fn from_config(blocks: B, config: &StoreConfig) -> Self {
        let backend = Self::new(blocks, JsonCodec).with_verify_reads(config.verify_reads);
        match config.cache {
            Some(cache) => backend.with_cache(SharedNodeCache::new(cache)),
            None => backend,
        }
    }
}

impl<B: BlockStore, C: NodeCodec> BlockBackend<B, C> {
    /// An uncached backend.
    pub fn new(blocks: B, codec: C) -> Self {
        Self {
            blocks,
            codec,
            cache: None,
            verify_reads: false,
        }
    }

    /// Route reads through `cache`.
    pub fn with_cache(mut self, cache: SharedNodeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Recompute block hashes on fetch.
    pub fn with_verify_reads(mut self, verify: bool) -> Self {
        self.verify_reads = verify;
        self
    }

    /// The underlying block store.
    pub fn blocks(&self) -> &B {
        &self.blocks
    }

    /// The node cache, if one is attached.
    pub fn cache(&self) -> Option<&SharedNodeCache> {
        self.cache.as_ref()
    }

    fn read_block(&self, id: &NodeId) -> NodeResult<Option<Block>> {
        let Some(block) = self.blocks.get(id)? else {
            return Ok(None);
        };
        if self.verify_reads {
            let computed = block.compute_id();
            if computed != *id {
                warn!(node = %id.short_hex(), "stored block does not match its id");
                return Err(StoreError::HashMismatch { id: *id, computed }.into());
            }
        }
        Ok(Some(block))
    }
}

impl<B: BlockStore, C: NodeCodec> NodeBackend for BlockBackend<B, C> {
    fn fetch_by_id(&self, id: &NodeId) -> NodeResult<Option<Node>> {
        if let Some(cache) = &self.cache {
            if let Some(node) = cache.lookup(id) {
                return Ok(Some(node));
            }
        }

        let Some(block) = self.read_block(id)? else {
            return Ok(None);
        };
        let node = self.codec.decode(&block)?;
        if let Some(cache) = &self.cache {
            cache.miss(id, &node);
        }
        Ok(Some(node))
    }

    fn encode_and_store(&self, links: &[Link], data: Option<&NodeData>) -> NodeResult<Node> {
        let bytes = self.codec.encode(links, data)?;
        let block = Block::new(bytes);
        self.blocks.put(&block)?;
        let node = self.codec.decode(&block)?;
        debug!(
            node = %node.id.short_hex(),
            size = node.size,
            links = node.links.len(),
            "stored node"
        );
        Ok(node)
    }

    fn delete_by_id(&self, id: &NodeId) -> NodeResult<bool> {
        if let Some(cache) = &self.cache {
            cache.evict(id);
        }
        Ok(self.blocks.delete(id)?)
    }
}

impl<B, C> std::fmt::Debug for BlockBackend<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockBackend")
            .field("cache", &self.cache)
            .field("verify_reads", &self.verify_reads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use mdag_cache::CacheConfig;
    use mdag_store::{FsBlockStore, InMemoryBlockStore};
    use serde_json::json;

    fn cached_backend(limit: u64) -> BlockBackend<InMemoryBlockStore> {
        BlockBackend::from_config(
            InMemoryBlockStore::new(),
            &StoreConfig {
                cache: Some(CacheConfig::with_total_limit(limit)),
                verify_reads: false,
            },
        )
    }

    #[test]
    fn fetch_populates_then_hits_cache() {
        let backend = cached_backend(1 << 20);
        let node = backend.encode_and_store(&[], Some(&json!("hi"))).unwrap();
        let cache = backend.cache().unwrap();
        assert!(!cache.has(&node.id));

        assert_eq!(backend.fetch_by_id(&node.id).unwrap(), Some(node.clone()));
        assert!(cache.has(&node.id));
        let tick_after_miss = cache.snapshot().tick();

        assert_eq!(backend.fetch_by_id(&node.id).unwrap(), Some(node));
        assert_eq!(cache.snapshot().tick(), tick_after_miss + 1);
    }

    #[test]
    fn cache_serves_reads_without_the_block() {
        let backend = cached_backend(1 << 20);
        let node = backend.encode_and_store(&[], Some(&json!(1))).unwrap();
        backend.fetch_by_id(&node.id).unwrap();

        // Remove the block behind the cache's back.
        backend.blocks().delete(&node.id).unwrap();
        assert_eq!(backend.fetch_by_id(&node.id).unwrap(), Some(node));
    }

    #[test]
    fn oversized_nodes_are_not_cached() {
        let backend = cached_backend(8);
        let node = backend.encode_and_store(&[], Some(&json!("large"))).unwrap();
        assert!(node.size > 8);
        backend.fetch_by_id(&node.id).unwrap();
        assert!(backend.cache().unwrap().snapshot().is_empty());
    }

    #[test]
    fn delete_evicts_and_removes() {
        let backend = cached_backend(1 << 20);
        let node = backend.encode_and_store(&[], Some(&json!(true))).unwrap();
        backend.fetch_by_id(&node.id).unwrap();

        assert!(backend.delete_by_id(&node.id).unwrap());
        assert!(!backend.cache().unwrap().has(&node.id));
        assert_eq!(backend.fetch_by_id(&node.id).unwrap(), None);
        assert!(!backend.delete_by_id(&node.id).unwrap());
    }

    #[test]
    fn raw_blocks_decode_as_raw_nodes() {
        let backend = BlockBackend::new(InMemoryBlockStore::new(), JsonCodec);
        let id = backend.blocks().put(&Block::new(b"raw bytes".to_vec())).unwrap();
        let node = backend.fetch_by_id(&id).unwrap().unwrap();
        assert!(node.is_raw());
        assert_eq!(node.size, 9);
    }

    #[test]
    fn verify_reads_surfaces_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = BlockBackend::new(FsBlockStore::open(dir.path()).unwrap(), JsonCodec)
            .with_verify_reads(true);
        let node = backend.encode_and_store(&[], Some(&json!("x"))).unwrap();

        let hex = node.id.to_hex();
        std::fs::write(dir.path().join(&hex[..2]).join(&hex[2..]), b"garbage").unwrap();

        let err = backend.fetch_by_id(&node.id).unwrap_err();
        assert!(matches!(
            err,
            NodeError::Store(StoreError::HashMismatch { .. })
        ));
    }
}
