use mdag_crypto::ContentHasher;
use mdag_types::{Identify, IdentityResult, NodeId};

/// A content-addressed byte blob.
///
/// The block store never interprets block contents; it only maps ids to
/// bytes. Decoding blocks into nodes is the codec's job.
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    /// Hash of `data` under [`ContentHasher::BLOCK`].
    pub id: NodeId,
    /// Raw block bytes.
    pub data: Vec<u8>,
}

impl Block {
    /// Hash `data` and wrap it as a block.
    pub fn new(data: Vec<u8>) -> Self {
        let id = ContentHasher::BLOCK.hash(&data);
        Self { id, data }
    }

    /// Wrap bytes under an id without re-hashing them.
    ///
    /// Used by backends that read bytes back from a trusted location.
    pub fn from_parts(id: NodeId, data: Vec<u8>) -> Self {
        Self { id, data }
    }

    /// Byte length of the block.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Recompute the id from the bytes.
    pub fn compute_id(&self) -> NodeId {
        ContentHasher::BLOCK.hash(&self.data)
    }

    /// Returns `true` if `id` matches the content.
    pub fn verify(&self) -> bool {
        ContentHasher::BLOCK.verify(&self.data, &self.id)
    }
}

impl Identify for Block {
    fn identify(&self) -> IdentityResult<Option<NodeId>> {
        Ok(Some(self.id))
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("size", &self.data.len())
            .finish()
    }
}
