//! Provenance tags for values read out of the store.
//!
//! Links and data returned by the store are wrapped in [`Tagged`] so that a
//! later write can tell where they came from. The tag is a hint: it says
//! "this was read from node X", not "this still equals node X". Writers must
//! compare before reusing the source node.

use std::ops::Deref;

use crate::id::NodeId;
use crate::link::Link;
use crate::node::Node;

/// The stored node a value was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Provenance {
    pub id: NodeId,
    pub size: u64,
    /// Links of the source node. Only recorded for data values.
    pub links: Option<Vec<Link>>,
}

impl Provenance {
    /// Provenance for a node's link list.
    pub fn of_links(node: &Node) -> Self {
        Self {
            id: node.id,
            size: node.size,
            links: None,
        }
    }

    /// Provenance for a node's data, including its links.
    pub fn of_data(node: &Node) -> Self {
        Self {
            id: node.id,
            size: node.size,
            links: Some(node.links.clone()),
        }
    }
}

/// A value with optional provenance metadata attached.
#[derive(Clone, Debug, PartialEq)]
pub struct Tagged<T> {
    value: T,
    provenance: Option<Provenance>,
}

impl<T> Tagged<T> {
    /// Wrap a value with no provenance.
    pub fn untagged(value: T) -> Self {
        Self {
            value,
            provenance: None,
        }
    }

    /// Wrap a value read from a stored node.
    pub fn with_provenance(value: T, provenance: Provenance) -> Self {
        Self {
            value,
            provenance: Some(provenance),
        }
    }

    /// The attached provenance, if any.
    pub fn provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref()
    }

    /// Id of the source node, if any.
    pub fn source_id(&self) -> Option<NodeId> {
        self.provenance.as_ref().map(|p| p.id)
    }

    /// Borrow the wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Mutable access to the wrapped value. The provenance is kept.
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Drop the provenance and return the value.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Split into value and provenance.
    pub fn into_parts(self) -> (T, Option<Provenance>) {
        (self.value, self.provenance)
    }
}

impl<T> Deref for Tagged<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> From<T> for Tagged<T> {
    fn from(value: T) -> Self {
        Self::untagged(value)
    }
}
