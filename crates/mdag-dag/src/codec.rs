//! Encoding nodes to and from block bytes.
//!
//! The store only requires that a codec be deterministic: the same links and
//! data must always produce the same bytes, and therefore the same id.
//!
//! [`JsonCodec`] frames every node with two header lines followed by a JSON
//! body:
//!
//! ```text
//! /mdag/v1\n
//! /json/v1\n
//! {"links":[...],"data":...}
//! ```
//!
//! Blocks without the `/mdag/v1` header are treated as raw content and
//! decode to a node with no encoding, links, or data.

use mdag_store::Block;
use mdag_types::{Link, Node, NodeData};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CodecError, CodecResult};

/// Turns `(links, data)` into canonical bytes and blocks back into nodes.
pub trait NodeCodec: Send + Sync {
    /// Encode links and data. Must be deterministic.
    fn encode(&self, links: &[Link], data: Option<&NodeData>) -> CodecResult<Vec<u8>>;

    /// Decode a block into a node carrying the block's id and size.
    fn decode(&self, block: &Block) -> CodecResult<Node>;
}

/// Outer header identifying a structured node block.
pub const MDAG_HEADER: &str = "/mdag/v1";

/// Header identifying the JSON body format.
pub const JSON_HEADER: &str = "/json/v1";

#[derive(Serialize)]
struct BodyRef<'a> {
    links: &'a [Link],
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a NodeData>,
}

#[derive(Deserialize)]
struct Body {
    #[serde(default)]
    links: Vec<Link>,
    #[serde(default, deserialize_with = "present")]
    data: Option<NodeData>,
}

/// A `data` key that is present is always `Some`, even when it holds `null`.
/// Only a missing key decodes as no data.
fn present<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NodeData>, D::Error> {
    NodeData::deserialize(de).map(Some)
}

/// JSON node codec.
///
/// Object keys in `data` are written in sorted order, which keeps the
/// encoding canonical.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl JsonCodec {
    fn prefix() -> String {
        format!("{MDAG_HEADER}\n{JSON_HEADER}\n")
    }

    /// Encoding tags reported on decoded nodes.
    pub fn encoding() -> Vec<String> {
        vec![MDAG_HEADER.to_string(), JSON_HEADER.to_string()]
    }
}

impl NodeCodec for JsonCodec {
    fn encode(&self, links: &[Link], data: Option<&NodeData>) -> CodecResult<Vec<u8>> {
        let mut bytes = Self::prefix().into_bytes();
        serde_json::to_writer(&mut bytes, &BodyRef { links, data })
            .map_err(|e| CodecError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    fn decode(&self, block: &Block) -> CodecResult<Node> {
        let outer = format!("{MDAG_HEADER}\n");
        let Some(rest) = block.data.strip_prefix(outer.as_bytes()) else {
            return Ok(Node::raw(block.id, block.size()));
        };

        let inner = format!("{JSON_HEADER}\n");
        let Some(body) = rest.strip_prefix(inner.as_bytes()) else {
            let header = rest.split(|b| *b == b'\n').next().unwrap_or_default();
            return Err(CodecError::UnknownHeader(
                String::from_utf8_lossy(header).into_owned(),
            ));
        };

        let body: Body = serde_json::from_slice(body).map_err(|e| CodecError::Corrupt {
            id: block.id,
            reason: e.to_string(),
        })?;

        Ok(Node {
            id: block.id,
            size: block.size(),
            encoding: Some(Self::encoding()),
            links: body.links,
            data: body.data,
        })
    }
}
