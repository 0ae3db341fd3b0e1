//! Node records and reachable-size aggregation.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::link::Link;

/// Decoded body of a node.
pub type NodeData = serde_json::Value;

/// An immutable record in the DAG.
///
/// `id` is the hash of the node's canonical encoded bytes and `size` is the
/// exact length of those bytes. Both are produced by the codec; nothing here
/// re-verifies them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Content address of the encoded bytes.
    pub id: NodeId,
    /// Encoded byte length.
    pub size: u64,
    /// Codec header tags, outermost first. `None` marks a raw block.
    pub encoding: Option<Vec<String>>,
    /// Outgoing links, in encoded order.
    pub links: Vec<Link>,
    /// Decoded body, if any.
    pub data: Option<NodeData>,
}

impl Node {
    /// A raw, untagged node: no encoding, no links, no data.
    pub fn raw(id: NodeId, size: u64) -> Self {
        Self {
            id,
            size,
            encoding: None,
            links: Vec::new(),
            data: None,
        }
    }

    /// Returns `true` if the node was stored as an untagged block.
    pub fn is_raw(&self) -> bool {
        self.encoding.is_none()
    }

    /// First link carrying the given name.
    pub fn link_named(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name.as_deref() == Some(name))
    }
}

/// Total bytes reachable from `node`: its own size plus the `tsize` of each
/// link that has one.
///
/// Links without a `tsize` contribute nothing, so a partially annotated graph
/// is under-counted rather than rejected. Sizes reported by links are not
/// trusted, and a total past `u64::MAX` saturates.
pub fn reachable_size(node: Option<&Node>) -> Option<u64> {
    let node = node?;
    Some(
        node.links
            .iter()
            .filter_map(|l| l.tsize)
            .fold(node.size, u64::saturating_add),
    )
}
