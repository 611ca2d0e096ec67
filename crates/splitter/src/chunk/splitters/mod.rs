//! Splitter implementations wrapper module.

mod pattern;
mod recursive;

pub use pattern::RegexSplitter;
pub use recursive::RecursiveCharacterSplitter;

use crate::chunk::{Chunk, ChunkIdGenerator, Document, SplitOutcome};

/// Trait for document splitters.
///
/// Implementations hold immutable configuration, so one instance can be
/// shared between threads and called concurrently.
pub trait DocumentSplitter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Split text into chunk texts, reporting non-fatal diagnostics.
    fn split_with_diagnostics(&self, text: &str) -> SplitOutcome;

    /// Split text into chunk texts. Empty text yields no chunks.
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with_diagnostics(text).chunks
    }

    /// Split text that may be absent. `None` yields no chunks.
    fn split_optional(&self, text: Option<&str>) -> Vec<String> {
        text.map(|t| self.split_text(t)).unwrap_or_default()
    }

    /// Split one document; every chunk receives a copy of its metadata.
    fn split_document(&self, document: &Document, ids: Option<&dyn ChunkIdGenerator>) -> Vec<Chunk> {
        self.split_text(&document.text)
            .into_iter()
            .map(|text| Chunk::new(text, document.metadata.clone(), ids))
            .collect()
    }

    /// Split every document in order and concatenate the results.
    fn split_all(&self, documents: &[Document], ids: Option<&dyn ChunkIdGenerator>) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|document| self.split_document(document, ids))
            .collect();

        tracing::debug!(
            "{} splitter produced {} chunks from {} documents",
            self.name(),
            chunks.len(),
            documents.len()
        );

        chunks
    }
}
