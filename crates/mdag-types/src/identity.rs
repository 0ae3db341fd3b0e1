//! Resolving heterogeneous values to node identifiers.
//!
//! Store operations accept anything implementing [`Identify`]: a bare
//! [`NodeId`], a [`Link`] (resolves to its target), a [`Node`], an
//! `Option` of any of these (`None` resolves to "no node"), and raw blocks
//! from `mdag-store`.
//!
//! Types can opt in to [`Identify`] without overriding
//! [`identify`](Identify::identify). The provided method reports
//! [`IdentityError::UnsupportedIdentity`], which surfaces as a caller error at
//! the store boundary.

use crate::error::{IdentityError, IdentityResult};
use crate::id::NodeId;
use crate::link::Link;
use crate::node::Node;

/// A value that may name a stored node.
pub trait Identify {
    /// Resolve to a node id. `Ok(None)` means the value names no node.
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        Err(IdentityError::UnsupportedIdentity(std::any::type_name::<Self>()))
    }
}

/// Resolve `value` to a node id.
pub fn identify<T: Identify + ?Sized>(value: &T) -> IdentityResult<Option<NodeId>> {
    value.identify()
}

impl Identify for NodeId {
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        Ok(Some(*self))
    }
}

impl Identify for Link {
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        Ok(Some(self.target))
    }
}

impl Identify for Node {
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        Ok(Some(self.id))
    }
}

impl<T: Identify> Identify for Option<T> {
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        match self {
            Some(value) => value.identify(),
            None => Ok(None),
        }
    }
}

impl<T: Identify + ?Sized> Identify for &T {
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        (**self).identify()
    }
}
