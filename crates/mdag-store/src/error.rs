use mdag_types::NodeId;

/// Errors from block store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Content hash mismatch (data corruption or a forged id).
    #[error("hash mismatch for {id}: computed {computed}")]
    HashMismatch { id: NodeId, computed: NodeId },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Attempted to store a block with no content.
    #[error("cannot store an empty block")]
    EmptyBlock,

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
