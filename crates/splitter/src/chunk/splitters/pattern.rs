//! Single-pattern regex splitter.

use super::DocumentSplitter;
use crate::chunk::SplitOutcome;
use ragkit_core::{AppError, AppResult};
use regex::Regex;

/// Splits on every match of one pattern. No size bound, no overlap, no
/// refinement: each non-empty piece becomes one chunk.
#[derive(Debug, Clone)]
pub struct RegexSplitter {
    pattern: Regex,
}

impl RegexSplitter {
    pub fn new(pattern: &str) -> AppResult<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| AppError::Config(format!("Invalid split pattern '{}': {}", pattern, e)))?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl DocumentSplitter for RegexSplitter {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn split_with_diagnostics(&self, text: &str) -> SplitOutcome {
        let chunks: Vec<String> = self
            .pattern
            .split(text)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();

        tracing::debug!(
            "Regex splitter created {} chunks from {} bytes",
            chunks.len(),
            text.len()
        );

        SplitOutcome {
            chunks,
            diagnostics: Vec::new(),
        }
    }
}
