//! Chunk identifiers derived from chunk content.

use super::Metadata;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Maps a finished chunk (text plus metadata) to a stable identifier.
pub trait ChunkIdGenerator: Send + Sync {
    fn generate(&self, text: &str, metadata: &Metadata) -> String;
}

/// SHA-256 over the chunk text and its canonical metadata JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashIdGenerator;

impl ChunkIdGenerator for ContentHashIdGenerator {
    fn generate(&self, text: &str, metadata: &Metadata) -> String {
        let mut hasher = Sha256::new();
        hasher.update(identity_bytes(text, metadata));
        format!("{:x}", hasher.finalize())
    }
}

/// Name-based (v5) UUID over the same bytes as [`ContentHashIdGenerator`].
#[derive(Debug, Clone, Copy)]
pub struct NameBasedUuidGenerator {
    namespace: Uuid,
}

impl NameBasedUuidGenerator {
    pub fn new(namespace: Uuid) -> Self {
        Self { namespace }
    }
}

impl Default for NameBasedUuidGenerator {
    fn default() -> Self {
        Self::new(Uuid::NAMESPACE_OID)
    }
}

impl ChunkIdGenerator for NameBasedUuidGenerator {
    fn generate(&self, text: &str, metadata: &Metadata) -> String {
        Uuid::new_v5(&self.namespace, &identity_bytes(text, metadata)).to_string()
    }
}

// Text, a NUL separator, then the metadata as JSON. BTreeMap keys serialize
// in sorted order.
fn identity_bytes(text: &str, metadata: &Metadata) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 64);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(0);
    // Serializing a map of JSON values cannot fail.
    if let Ok(json) = serde_json::to_vec(metadata) {
        bytes.extend_from_slice(&json);
    }
    bytes
}
