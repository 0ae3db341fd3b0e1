use std::collections::HashMap;
use std::sync::RwLock;

use mdag_types::NodeId;
use tracing::debug;

use crate::block::Block;
use crate::error::StoreResult;
use crate::traits::{validate_block, BlockStore};

/// In-memory, HashMap-based block store.
///
/// Intended for tests and embedding. Blocks live behind a `RwLock` for safe
/// concurrent access and are cloned on read/write.
pub struct InMemoryBlockStore {
    blocks: RwLock<HashMap<NodeId, Vec<u8>>>,
}

impl InMemoryBlockStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blocks currently stored.
    pub fn len(&self) -> usize {
        self.blocks.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blocks.
    pub fn total_bytes(&self) -> u64 {
        self.blocks
            .read()
            .expect("lock poisoned")
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Remove all blocks from the store.
    pub fn clear(&self) {
        self.blocks.write().expect("lock poisoned").clear();
    }

    /// Sorted list of all block ids in the store.
    pub fn ids(&self) -> Vec<NodeId> {
        let map = self.blocks.read().expect("lock poisoned");
        let mut ids: Vec<NodeId> = map.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockStore for InMemoryBlockStore {
    fn get(&self, id: &NodeId) -> StoreResult<Option<Block>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.get(id).map(|data| Block::from_parts(*id, data.clone())))
    }

    fn put(&self, block: &Block) -> StoreResult<NodeId> {
        validate_block(block)?;
        let mut map = self.blocks.write().expect("lock poisoned");
        map.entry(block.id).or_insert_with(|| {
            debug!(block = %block.id.short_hex(), size = block.data.len(), "stored block");
            block.data.clone()
        });
        Ok(block.id)
    }

    fn delete(&self, id: &NodeId) -> StoreResult<bool> {
        let mut map = self.blocks.write().expect("lock poisoned");
        let removed = map.remove(id).is_some();
        if removed {
            debug!(block = %id.short_hex(), "deleted block");
        }
        Ok(removed)
    }

    fn contains(&self, id: &NodeId) -> StoreResult<bool> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn stat(&self, id: &NodeId) -> StoreResult<Option<u64>> {
        let map = self.blocks.read().expect("lock poisoned");
        Ok(map.get(id).map(|data| data.len() as u64))
    }
}

impl std::fmt::Debug for InMemoryBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryBlockStore")
            .field("block_count", &count)
            .finish()
    }
}
