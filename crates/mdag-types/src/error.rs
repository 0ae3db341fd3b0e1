use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors produced while resolving a value to a [`NodeId`](crate::NodeId).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The value's type has no way to name a node. This is a caller error.
    #[error("value of type `{0}` cannot be resolved to a node id")]
    UnsupportedIdentity(&'static str),
}

/// Result alias for identity resolution.
pub type IdentityResult<T> = Result<T, IdentityError>;
