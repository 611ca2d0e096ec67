//! Document model and chunking pipeline.
//!
//! This module provides:
//! - `Document` and `Chunk`, with metadata passed through unchanged
//! - Content-type detection with per-type separator presets
//! - Recursive and regex splitters behind one trait
//! - Deterministic chunk identifiers

mod detection;
mod merging;
mod metadata;
mod pipeline;
pub mod splitters;

pub use detection::{detect_content_type, ContentType, Language, DEFAULT_SEPARATORS};
pub use metadata::{ChunkIdGenerator, ContentHashIdGenerator, NameBasedUuidGenerator};
pub use pipeline::{ChunkConfig, ChunkPipeline, PipelineOutput};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Key-value metadata attached to a document and copied onto its chunks.
///
/// An ordered map so that serializing it (for ID hashing) is deterministic.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A source text with associated metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,

    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(text: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Add a single metadata entry.
    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One bounded piece of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Identifier derived from `text` and `metadata`, when a generator was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Chunk text content
    pub text: String,

    /// Exact copy of the source document's metadata
    #[serde(default)]
    pub metadata: Metadata,
}

impl Chunk {
    /// Build a chunk, computing its id from its own content when `ids` is set.
    pub fn new(text: String, metadata: Metadata, ids: Option<&dyn ChunkIdGenerator>) -> Self {
        let id = ids.map(|generator| generator.generate(&text, &metadata));
        Self { id, text, metadata }
    }

    /// Length in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A non-fatal condition observed while splitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitDiagnostic {
    /// A produced chunk is longer than the configured chunk size.
    OversizedChunk {
        /// Position of the chunk in the returned sequence
        index: usize,
        length: usize,
        chunk_size: usize,
    },
}

impl fmt::Display for SplitDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitDiagnostic::OversizedChunk {
                index,
                length,
                chunk_size,
            } => write!(
                f,
                "chunk {} has {} characters, exceeding chunk size {}",
                index, length, chunk_size
            ),
        }
    }
}

/// Chunk texts plus any diagnostics raised while producing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutcome {
    pub chunks: Vec<String>,
    pub diagnostics: Vec<SplitDiagnostic>,
}
