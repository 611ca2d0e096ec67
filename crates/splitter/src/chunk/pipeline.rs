//! Chunking pipeline orchestrator.

use super::{
    detection::{detect_content_type, ContentType},
    splitters::{DocumentSplitter, RecursiveCharacterSplitter, RegexSplitter},
    Chunk, ChunkIdGenerator, Document, SplitDiagnostic,
};
use ragkit_core::AppResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Configuration for the chunking pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Target upper bound on chunk length, in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters carried over from the end of one chunk to the next
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Explicit separator list; the content-type preset is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separators: Option<Vec<String>>,

    /// Split on this pattern instead, with no size bound or overlap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: None,
            regex: None,
        }
    }
}

impl ChunkConfig {
    /// Check that a splitter can be built from this configuration.
    pub fn validate(&self) -> AppResult<()> {
        match &self.regex {
            Some(pattern) => RegexSplitter::new(pattern).map(|_| ()),
            None => RecursiveCharacterSplitter::from_config(self, ContentType::Text.separators())
                .map(|_| ()),
        }
    }
}

/// Chunks produced for one document.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub content_type: ContentType,
    pub chunks: Vec<Chunk>,
    pub diagnostics: Vec<SplitDiagnostic>,
}

/// Content-aware chunking pipeline.
///
/// Immutable once built; share it behind an `Arc` to split many documents
/// concurrently.
pub struct ChunkPipeline {
    config: ChunkConfig,
    regex: Option<RegexSplitter>,
    ids: Option<Arc<dyn ChunkIdGenerator>>,
}

impl ChunkPipeline {
    /// Create a new pipeline, rejecting invalid configuration up front.
    pub fn new(config: ChunkConfig) -> AppResult<Self> {
        config.validate()?;
        let regex = config.regex.as_deref().map(RegexSplitter::new).transpose()?;

        Ok(Self {
            config,
            regex,
            ids: None,
        })
    }

    /// Attach an identifier generator applied to every produced chunk.
    pub fn with_id_generator(mut self, ids: Arc<dyn ChunkIdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split one document. `path`, when known, drives content detection.
    pub fn process(&self, document: &Document, path: Option<&Path>) -> AppResult<PipelineOutput> {
        // 1. Detect content type
        let content_type = detect_content_type(path, &document.text);

        tracing::debug!("Detected content type {:?} for {:?}", content_type, path);

        // 2. Select appropriate splitter
        let recursive;
        let splitter: &dyn DocumentSplitter = match &self.regex {
            Some(regex) => regex,
            None => {
                recursive =
                    RecursiveCharacterSplitter::from_config(&self.config, content_type.separators())?;
                &recursive
            }
        };

        // 3. Split and attach metadata and ids
        let outcome = splitter.split_with_diagnostics(&document.text);
        let ids = self.ids.as_deref();
        let chunks: Vec<Chunk> = outcome
            .chunks
            .into_iter()
            .map(|text| Chunk::new(text, document.metadata.clone(), ids))
            .collect();

        tracing::info!(
            "Chunking complete: {} chunks from {} bytes using {} splitter",
            chunks.len(),
            document.text.len(),
            splitter.name()
        );

        Ok(PipelineOutput {
            content_type,
            chunks,
            diagnostics: outcome.diagnostics,
        })
    }

    /// Split every document in order, concatenating chunks and diagnostics.
    ///
    /// Diagnostic indices refer to positions in the combined chunk list.
    pub fn process_all(&self, documents: &[Document]) -> AppResult<(Vec<Chunk>, Vec<SplitDiagnostic>)> {
        let mut chunks = Vec::new();
        let mut diagnostics = Vec::new();

        for document in documents {
            let offset = chunks.len();
            let output = self.process(document, None)?;
            diagnostics.extend(output.diagnostics.into_iter().map(|d| d.shifted(offset)));
            chunks.extend(output.chunks);
        }

        Ok((chunks, diagnostics))
    }
}

impl SplitDiagnostic {
    fn shifted(self, offset: usize) -> Self {
        match self {
            SplitDiagnostic::OversizedChunk {
                index,
                length,
                chunk_size,
            } => SplitDiagnostic::OversizedChunk {
                index: index + offset,
                length,
                chunk_size,
            },
        }
    }
}
