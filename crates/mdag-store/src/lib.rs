//! Content-addressed block storage for the MerkleDAG node store.
//!
//! A block store is a plain key-value store from [`NodeId`](mdag_types::NodeId)
//! to bytes, analogous to git's `.git/objects/` directory. It never decodes
//! what it holds; turning blocks into nodes is the codec's job.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlockStore`] trait:
//!
//! - [`InMemoryBlockStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlockStore`] -- loose files under a fan-out directory
//!
//! # Design Rules
//!
//! 1. Blocks are immutable once written (content-addressing guarantees this).
//! 2. A block is accepted only if its id matches its bytes.
//! 3. Concurrent reads are always safe.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod block;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use block::Block;
pub use error::{StoreError, StoreResult};
pub use fs::FsBlockStore;
pub use memory::InMemoryBlockStore;
pub use traits::BlockStore;
