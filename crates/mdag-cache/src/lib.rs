//! Size-bounded node cache for the MerkleDAG node store.
//!
//! - [`NodeCache`] -- immutable cache value; every operation returns a new one
//! - [`SharedNodeCache`] -- atomic cell applying cache transitions with
//!   compare-and-retry, for sharing one cache across threads
//! - [`CacheConfig`] -- total and per-node byte limits
//!
//! Eviction is strict least-recently-used by logical tick. The cache never
//! fails; operations only change its shape.

pub mod cache;
pub mod config;
pub mod shared;

pub use cache::{EntryStat, NodeCache};
pub use config::CacheConfig;
pub use shared::SharedNodeCache;
