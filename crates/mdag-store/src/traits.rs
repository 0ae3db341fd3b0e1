use mdag_types::NodeId;

use crate::block::Block;
use crate::error::StoreResult;

/// Content-addressed block store.
///
/// All implementations must satisfy these invariants:
/// - Blocks are immutable once written. The same bytes always produce the
///   same id, so writing an existing block is a no-op.
/// - A block is only accepted if its id matches its content.
/// - Concurrent reads are always safe.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlockStore: Send + Sync {
    /// Read a block by id.
    ///
    /// Returns `Ok(None)` if the block does not exist.
    fn get(&self, id: &NodeId) -> StoreResult<Option<Block>>;

    /// Write a block and return its id.
    ///
    /// If the block already exists, this is a no-op (idempotent).
    fn put(&self, block: &Block) -> StoreResult<NodeId>;

    /// Delete a block by id. Returns `true` if the block existed.
    fn delete(&self, id: &NodeId) -> StoreResult<bool>;

    /// Check whether a block exists.
    fn contains(&self, id: &NodeId) -> StoreResult<bool>;

    /// Size in bytes of a stored block, without reading it.
    fn stat(&self, id: &NodeId) -> StoreResult<Option<u64>>;

    /// Read multiple blocks in a batch.
    ///
    /// Default implementation calls `get()` for each id.
    fn get_many(&self, ids: &[NodeId]) -> StoreResult<Vec<Option<Block>>> {
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Write multiple blocks in a batch and return their ids.
    ///
    /// Default implementation calls `put()` for each block.
    fn put_many(&self, blocks: &[Block]) -> StoreResult<Vec<NodeId>> {
        blocks.iter().map(|b| self.put(b)).collect()
    }
}

/// Check a block before it is written.
pub(crate) fn validate_block(block: &Block) -> StoreResult<()> {
    if block.data.is_empty() {
        return Err(crate::error::StoreError::EmptyBlock);
    }
    let computed = block.compute_id();
    if computed != block.id {
        return Err(crate::error::StoreError::HashMismatch {
            id: block.id,
            computed,
        });
    }
    Ok(())
}
