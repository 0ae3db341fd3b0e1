//! The node store API.
//!
//! [`NodeStore`] accepts anything that implements [`Identify`] wherever a
//! node is named. Values that resolve to no node produce `Ok(None)` rather
//! than an error; only unsupported value types and collaborator failures are
//! errors.

use mdag_store::{BlockStore, InMemoryBlockStore};
use mdag_types::{Identify, Link, Node, NodeData, NodeId, Provenance, Tagged};
use tracing::debug;

use crate::backend::{BlockBackend, NodeBackend};
use crate::config::StoreConfig;
use crate::error::NodeResult;

/// Reads, writes, and deletes nodes through a [`NodeBackend`].
#[derive(Debug)]
pub struct NodeStore<N> {
    backend: N,
}

impl NodeStore<BlockBackend<InMemoryBlockStore>> {
    /// A node store over a fresh in-memory block store.
    pub fn in_memory(config: &StoreConfig) -> Self {
        Self::new(BlockBackend::from_config(InMemoryBlockStore::new(), config))
    }
}

impl<B: BlockStore> NodeStore<BlockBackend<B>> {
    /// A JSON-encoding node store over `blocks`.
    pub fn with_blocks(blocks: B, config: &StoreConfig) -> Self {
        Self::new(BlockBackend::from_config(blocks, config))
    }
}

impl<N: NodeBackend> NodeStore<N> {
    /// Wrap a backend.
    pub fn new(backend: N) -> Self {
        Self { backend }
    }

    /// The backing collaborator.
    pub fn backend(&self) -> &N {
        &self.backend
    }

    /// Fetch the node named by `value`.
    pub fn get_node<I: Identify + ?Sized>(&self, value: &I) -> NodeResult<Option<Node>> {
        match value.identify()? {
            Some(id) => self.backend.fetch_by_id(&id),
            None => Ok(None),
        }
    }

    /// Fetch the links of the node named by `value`, tagged with the node
    /// they came from.
    pub fn get_links<I: Identify + ?Sized>(
        &self,
        value: &I,
    ) -> NodeResult<Option<Tagged<Vec<Link>>>> {
        Ok(self.get_node(value)?.map(|node| {
            let provenance = Provenance::of_links(&node);
            Tagged::with_provenance(node.links, provenance)
        }))
    }

    /// Fetch the data of the node named by `value`, tagged with the node it
    /// came from. Nodes without data yield `None`.
    pub fn get_data<I: Identify + ?Sized>(
        &self,
        value: &I,
    ) -> NodeResult<Option<Tagged<NodeData>>> {
        Ok(self.get_node(value)?.and_then(|node| {
            let provenance = Provenance::of_data(&node);
            node.data.map(|data| Tagged::with_provenance(data, provenance))
        }))
    }

    /// Store a node built from `links` and `data`.
    ///
    /// Returns `Ok(None)` when there is nothing to store: no data and no links,
    /// where an empty link list counts as no links. When either value carries
    /// provenance, the source node is fetched and returned as-is if its links
    /// and data still equal the ones given, skipping the write. Otherwise the
    /// node is encoded and written.
    pub fn store_node(
        &self,
        links: Option<Tagged<Vec<Link>>>,
        data: Option<Tagged<NodeData>>,
    ) -> NodeResult<Option<Node>> {
        let no_links = links.as_ref().map_or(true, |l| l.value().is_empty());
        if no_links && data.is_none() {
            return Ok(None);
        }

        let source = provenance_source(links.as_ref(), data.as_ref());
        let links: &[Link] = links
            .as_ref()
            .map(|l| l.value().as_slice())
            .unwrap_or_default();
        let data_ref = data.as_ref().map(Tagged::value);

        if let Some(source) = source {
            if let Some(existing) = self.backend.fetch_by_id(&source)? {
                if existing.links.as_slice() == links && existing.data.as_ref() == data_ref {
                    debug!(node = %existing.id.short_hex(), "reused unchanged node");
                    return Ok(Some(existing));
                }
            }
        }

        self.backend.encode_and_store(links, data_ref).map(Some)
    }

    /// Delete the node named by `value`.
    ///
    /// Returns `Ok(None)` if `value` names no node, otherwise whether the
    /// backend had it.
    pub fn delete_node<I: Identify + ?Sized>(&self, value: &I) -> NodeResult<Option<bool>> {
        match value.identify()? {
            Some(id) => self.backend.delete_by_id(&id).map(Some),
            None => Ok(None),
        }
    }
}

/// Source node claimed by the values being stored. Links win over data.
fn provenance_source(
    links: Option<&Tagged<Vec<Link>>>,
    data: Option<&Tagged<NodeData>>,
) -> Option<NodeId> {
    links
        .and_then(Tagged::source_id)
        .or_else(|| data.and_then(Tagged::source_id))
}
