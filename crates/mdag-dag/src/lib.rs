//! Node storage for the MerkleDAG.
//!
//! [`NodeStore`] is the entry point. It resolves whatever the caller passes
//! to a node id, reads through a [`NodeBackend`], and skips writes whose
//! content provably already exists.
//!
//! # Modules
//!
//! - [`api`] -- [`NodeStore`]: get/store/delete over any [`NodeBackend`]
//! - [`backend`] -- [`NodeBackend`] trait and the block-store-backed [`BlockBackend`]
//! - [`codec`] -- [`NodeCodec`] trait and the [`JsonCodec`] block format
//! - [`config`] -- [`StoreConfig`], loadable from TOML
//! - [`error`] -- Error types for node store operations

pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;

pub use api::NodeStore;
pub use backend::{BlockBackend, NodeBackend};
pub use codec::{JsonCodec, NodeCodec, JSON_HEADER, MDAG_HEADER};
pub use config::StoreConfig;
pub use error::{CodecError, CodecResult, NodeError, NodeResult};
