//! Foundation types for the MerkleDAG node store.
//!
//! Every other `mdag` crate depends on `mdag-types`.
//!
//! # Key Types
//!
//! - [`NodeId`] -- Content address of a node's encoded bytes (BLAKE3)
//! - [`Link`] -- Named, size-annotated edge to another node
//! - [`Node`] -- Immutable decoded record: id, size, encoding, links, data
//! - [`Tagged`] / [`Provenance`] -- Values annotated with the node they came from
//! - [`Identify`] -- Resolution of heterogeneous values to a [`NodeId`]

pub mod error;
pub mod id;
pub mod identity;
pub mod link;
pub mod node;
pub mod provenance;

pub use error::{IdentityError, IdentityResult, TypeError};
pub use id::NodeId;
pub use identity::{identify, Identify};
pub use link::Link;
pub use node::{reachable_size, Node, NodeData};
pub use provenance::{Provenance, Tagged};
