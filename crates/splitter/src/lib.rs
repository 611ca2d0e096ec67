//! Document splitting for retrieval-augmented generation.
//!
//! Splits text into bounded, overlapping chunks that prefer natural
//! boundaries, and carries document metadata onto every chunk.
//!
//! ```
//! use ragkit_splitter::{DocumentSplitter, RecursiveCharacterSplitter};
//!
//! let splitter = RecursiveCharacterSplitter::new([""], 5, 0).unwrap();
//! assert_eq!(splitter.split_text("abcdefghij"), vec!["abcde", "fghij"]);
//! ```

pub mod chunk;
pub mod config;


// Re-export commonly used types
pub use chunk::splitters::{DocumentSplitter, RecursiveCharacterSplitter, RegexSplitter};
pub use chunk::{
    detect_content_type, Chunk, ChunkConfig, ChunkIdGenerator, ChunkPipeline,
    ContentHashIdGenerator, ContentType, Document, Language, Metadata, NameBasedUuidGenerator,
    PipelineOutput, SplitDiagnostic, SplitOutcome, DEFAULT_SEPARATORS,
};
