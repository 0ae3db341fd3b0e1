//! Hashing primitives for the MerkleDAG node store.
//!
//! Provides domain-separated BLAKE3 hashing that turns encoded block bytes
//! into [`NodeId`](mdag_types::NodeId)s. All crypto wraps established
//! libraries; nothing here is custom.

pub mod hasher;

pub use hasher::ContentHasher;
