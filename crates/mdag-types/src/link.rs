use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::node::{reachable_size, Node};

/// A directed edge from one node to another.
///
/// `tsize` is the total number of bytes reachable through `target`, as
/// reported by whoever created the link. It is never verified.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Optional human-readable edge label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Node this link points at.
    pub target: NodeId,
    /// Total reachable byte size behind `target`, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tsize: Option<u64>,
}

impl Link {
    /// An anonymous link with no size annotation.
    pub fn new(target: NodeId) -> Self {
        Self {
            name: None,
            target,
            tsize: None,
        }
    }

    /// A named link with no size annotation.
    pub fn named(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: Some(name.into()),
            target,
            tsize: None,
        }
    }

    /// Attach a total reachable size.
    pub fn with_tsize(mut self, tsize: u64) -> Self {
        self.tsize = Some(tsize);
        self
    }

    /// Build a link to `node`, annotated with its reachable size.
    pub fn to_node(name: Option<String>, node: &Node) -> Self {
        Self {
            name,
            target: node.id,
            tsize: reachable_size(Some(node)),
        }
    }
}
