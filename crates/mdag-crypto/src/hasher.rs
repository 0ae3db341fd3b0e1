use mdag_types::NodeId;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"mdag-block-v1"`) that is prepended
/// to every hash computation, so ids minted for blocks can never collide with
/// digests computed for some other purpose over the same bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for stored blocks. Every block id is minted with this domain.
    pub const BLOCK: Self = Self {
        domain: "mdag-block-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> NodeId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        NodeId::from_digest(*hasher.finalize().as_bytes())
    }

    /// Verify that data produces the expected id.
    pub fn verify(&self, data: &[u8], expected: &NodeId) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
