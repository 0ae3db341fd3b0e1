//! Error types for node store operations.

use mdag_store::StoreError;
use mdag_types::{IdentityError, NodeId};

/// Errors raised while encoding or decoding node blocks.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The body could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The block starts with a node header this codec does not understand.
    #[error("unsupported codec header: {0}")]
    UnknownHeader(String),

    /// The block has a recognised header but a malformed body.
    #[error("corrupt node {id}: {reason}")]
    Corrupt { id: NodeId, reason: String },
}

/// Convenience alias for codec results.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from the node store.
///
/// Collaborator failures are wrapped, never reinterpreted.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The caller passed a value that cannot name a node.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The block store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Store configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience alias for node store results.
pub type NodeResult<T> = Result<T, NodeError>;
