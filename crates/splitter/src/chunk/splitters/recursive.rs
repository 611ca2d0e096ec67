//! Recursive character splitter.
//!
//! Splits on the most specific separator present in the text, packs the
//! resulting pieces into overlapping chunks, and descends to finer
//! separators for pieces that are still too long.

use super::DocumentSplitter;
use crate::chunk::{
    detection::DEFAULT_SEPARATORS, merging::merge_splits, ChunkConfig, SplitOutcome,
};
use ragkit_core::{AppError, AppResult};

/// Splitter that prefers natural boundaries (paragraph, line, sentence,
/// word) before falling back to arbitrary characters.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    separators: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Pending step on the explicit work stack. Both variants borrow from the
/// input; text is only copied when a finished chunk is joined.
enum Work<'a> {
    /// Split `text`, considering only separators from index `from` onward.
    Split { text: &'a str, from: usize },
    /// Pack the short pieces of `text`, a run of consecutive pieces
    /// obtained with separator `separator`.
    Merge { text: &'a str, separator: usize },
}

impl RecursiveCharacterSplitter {
    /// Create a splitter. Fails when `chunk_size` is zero, when
    /// `chunk_overlap >= chunk_size`, or when `separators` is empty.
    pub fn new<I, S>(separators: I, chunk_size: usize, chunk_overlap: usize) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let separators: Vec<String> = separators.into_iter().map(Into::into).collect();

        if separators.is_empty() {
            return Err(AppError::Config(
                "at least one separator is required".to_string(),
            ));
        }
        validate_sizes(chunk_size, chunk_overlap)?;

        Ok(Self {
            separators,
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create a splitter over the default paragraph/line/sentence/word list.
    pub fn with_default_separators(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        Self::new(DEFAULT_SEPARATORS.iter().copied(), chunk_size, chunk_overlap)
    }

    /// Create a splitter from a chunk config, using `fallback` separators
    /// when the config does not list its own.
    pub fn from_config(config: &ChunkConfig, fallback: &[&str]) -> AppResult<Self> {
        match &config.separators {
            Some(separators) => {
                Self::new(separators.iter().cloned(), config.chunk_size, config.chunk_overlap)
            }
            None => Self::new(fallback.iter().copied(), config.chunk_size, config.chunk_overlap),
        }
    }

    pub fn separators(&self) -> &[String] {
        &self.separators
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Index of the first separator at or after `from` that is empty or
    /// occurs in `text`; the last separator when none does.
    fn select_separator(&self, text: &str, from: usize) -> usize {
        self.separators[from..]
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
            .map(|offset| from + offset)
            .unwrap_or(self.separators.len() - 1)
    }

    /// Expand one `Split` step into the follow-up work, in encounter order.
    fn plan<'a>(&self, text: &'a str, from: usize) -> Vec<Work<'a>> {
        let index = self.select_separator(text, from);
        let mut planned = Vec::new();
        // Byte range of the current run of short pieces.
        let mut run: Option<(usize, usize)> = None;

        for (start, piece) in split_on(text, &self.separators[index]) {
            if piece.is_empty() {
                continue;
            }
            if piece.chars().count() < self.chunk_size {
                let end = start + piece.len();
                run = Some(run.map_or((start, end), |(first, _)| (first, end)));
            } else {
                if let Some((first, last)) = run.take() {
                    planned.push(Work::Merge {
                        text: &text[first..last],
                        separator: index,
                    });
                }
                planned.push(Work::Split {
                    text: piece,
                    from: index + 1,
                });
            }
        }

        if let Some((first, last)) = run {
            planned.push(Work::Merge {
                text: &text[first..last],
                separator: index,
            });
        }

        planned
    }
}

impl DocumentSplitter for RecursiveCharacterSplitter {
    fn name(&self) -> &'static str {
        "recursive"
    }

    fn split_with_diagnostics(&self, text: &str) -> SplitOutcome {
        let mut outcome = SplitOutcome::default();
        if text.is_empty() {
            return outcome;
        }

        let length = text.chars().count();
        if length <= self.chunk_size {
            outcome.push_chunk(text.to_string(), length, self.chunk_size);
            return outcome;
        }

        let mut stack = vec![Work::Split { text, from: 0 }];

        while let Some(work) = stack.pop() {
            match work {
                Work::Merge { text, separator } => {
                    let separator = self.separators[separator].as_str();
                    let pieces = split_on(text, separator)
                        .map(|(_, piece)| piece)
                        .filter(|piece| !piece.is_empty());
                    merge_splits(
                        pieces,
                        separator,
                        self.chunk_size,
                        self.chunk_overlap,
                        &mut outcome,
                    );
                }
                Work::Split { text, from } if from >= self.separators.len() => {
                    // No finer separator left: the piece is atomic.
                    let length = text.chars().count();
                    outcome.push_chunk(text.to_string(), length, self.chunk_size);
                }
                Work::Split { text, from } => {
                    stack.extend(self.plan(text, from).into_iter().rev());
                }
            }
        }

        tracing::debug!(
            "Recursive splitter created {} chunks from {} chars ({} oversized)",
            outcome.chunks.len(),
            length,
            outcome.diagnostics.len()
        );

        outcome
    }
}

/// Reject sizes that would make packing degenerate or non-terminating.
pub(crate) fn validate_sizes(chunk_size: usize, chunk_overlap: usize) -> AppResult<()> {
    if chunk_size == 0 {
        return Err(AppError::Config("chunk_size must be positive".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(AppError::Config(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }
    Ok(())
}

/// Pieces of `text` between occurrences of `separator`, each with its byte
/// offset. The empty separator yields single characters.
fn split_on<'t: 's, 's>(
    text: &'t str,
    separator: &'s str,
) -> Box<dyn Iterator<Item = (usize, &'t str)> + 's> {
    if separator.is_empty() {
        return Box::new(
            text.char_indices()
                .map(move |(start, c)| (start, &text[start..start + c.len_utf8()])),
        );
    }

    let mut offset = 0;
    Box::new(text.split(separator).map(move |piece| {
        let start = offset;
        offset += piece.len() + separator.len();
        (start, piece)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::SplitDiagnostic;

    const PROSE: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

    #[test]
    fn test_sentence_example() {
        let splitter = RecursiveCharacterSplitter::new(PROSE, 20, 5).unwrap();
        let chunks = splitter.split_text("Hello world. This is a test of splitting.");

        assert_eq!(chunks, vec!["Hello world", "This is a test of", "of splitting."]);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
        }
    }

    #[test]
    fn test_character_fallback() {
        let splitter = RecursiveCharacterSplitter::new([""], 5, 0).unwrap();
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_character_fallback_with_overlap() {
        let splitter = RecursiveCharacterSplitter::new([""], 4, 1).unwrap();
        assert_eq!(splitter.split_text("abcdefg"), vec!["abcd", "defg"]);
    }

    #[test]
    fn test_oversized_atomic_word() {
        let splitter = RecursiveCharacterSplitter::new(["\n\n", "\n", " "], 100, 10).unwrap();
        let word = "w".repeat(1000);

        let outcome = splitter.split_with_diagnostics(&word);
        assert_eq!(outcome.chunks, vec![word.clone()]);
        assert_eq!(
            outcome.diagnostics,
            vec![SplitDiagnostic::OversizedChunk {
                index: 0,
                length: 1000,
                chunk_size: 100
            }]
        );
    }

    #[test]
    fn test_oversized_word_between_short_ones() {
        let splitter = RecursiveCharacterSplitter::new([" "], 10, 0).unwrap();
        let text = format!("tiny {} end", "x".repeat(15));

        let outcome = splitter.split_with_diagnostics(&text);
        assert_eq!(outcome.chunks, vec!["tiny".to_string(), "x".repeat(15), "end".to_string()]);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(matches!(
            outcome.diagnostics[0],
            SplitDiagnostic::OversizedChunk { index: 1, length: 15, .. }
        ));
    }

    #[test]
    fn test_piece_of_exact_size_is_not_flagged() {
        let splitter = RecursiveCharacterSplitter::new([" "], 5, 0).unwrap();
        let outcome = splitter.split_with_diagnostics("abcde fghij");
        assert_eq!(outcome.chunks, vec!["abcde", "fghij"]);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_descends_to_finer_separator() {
        let splitter = RecursiveCharacterSplitter::new(PROSE, 12, 0).unwrap();
        let text = "Short one.\n\nThis paragraph is much longer";

        let chunks = splitter.split_text(text);
        assert_eq!(chunks[0], "Short one.");
        assert_eq!(&chunks[1..], ["This", "paragraph is", "much longer"]);
    }

    #[test]
    fn test_paragraphs_are_packed_together() {
        let splitter = RecursiveCharacterSplitter::new(PROSE, 30, 0).unwrap();
        let text = "First para.\n\nSecond para.\n\nThird paragraph here.";

        let chunks = splitter.split_text(text);
        assert_eq!(chunks, vec!["First para.\n\nSecond para.", "Third paragraph here."]);
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = RecursiveCharacterSplitter::new(PROSE, 50, 10).unwrap();
        let text = "a  b\n\n\nc";
        assert_eq!(splitter.split_text(text), vec![text]);
    }

    #[test]
    fn test_empty_and_absent_input() {
        let splitter = RecursiveCharacterSplitter::with_default_separators(10, 2).unwrap();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_optional(None).is_empty());
        assert_eq!(splitter.split_optional(Some("abc")), vec!["abc"]);
    }

    #[test]
    fn test_empty_pieces_are_dropped() {
        let splitter = RecursiveCharacterSplitter::new([" "], 5, 0).unwrap();
        let chunks = splitter.split_text("ab   cd   ef");
        assert_eq!(chunks, vec!["ab cd", "ef"]);
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        let err = RecursiveCharacterSplitter::new(PROSE, 10, 10).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(RecursiveCharacterSplitter::new(PROSE, 10, 20).is_err());
    }

    #[test]
    fn test_rejects_zero_size_and_no_separators() {
        assert!(RecursiveCharacterSplitter::new(PROSE, 0, 0).is_err());
        assert!(RecursiveCharacterSplitter::new(Vec::<String>::new(), 10, 0).is_err());
    }

    #[test]
    fn test_last_separator_used_when_none_match() {
        let splitter = RecursiveCharacterSplitter::new(["\n\n", "|"], 4, 0).unwrap();
        assert_eq!(splitter.select_separator("abcdef", 0), 1);
        // "|" is absent, so the text is atomic and kept whole.
        assert_eq!(splitter.split_text("abcdef"), vec!["abcdef"]);
    }

    #[test]
    fn test_from_config_prefers_explicit_separators() {
        let config = ChunkConfig {
            chunk_size: 8,
            chunk_overlap: 0,
            separators: Some(vec!["-".to_string()]),
            regex: None,
        };
        let splitter = RecursiveCharacterSplitter::from_config(&config, &PROSE).unwrap();
        assert_eq!(splitter.separators(), ["-"]);
        assert_eq!(splitter.split_text("aaa-bbb-ccc"), vec!["aaa-bbb", "ccc"]);
    }

    #[test]
    fn test_single_character_chunks() {
        let splitter = RecursiveCharacterSplitter::new(PROSE, 1, 0).unwrap();
        let outcome = splitter.split_with_diagnostics("ab cd");
        assert_eq!(outcome.chunks, vec!["a", "b", "c", "d"]);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_character_fallback_plans_one_borrowed_run() {
        let splitter = RecursiveCharacterSplitter::with_default_separators(1000, 200).unwrap();
        let text = "x".repeat(50_000);

        let planned = splitter.plan(&text, 0);
        assert_eq!(planned.len(), 1);
        assert!(matches!(
            planned[0],
            Work::Merge { text: run, separator: 6 } if std::ptr::eq(run, text.as_str())
        ));
    }

    #[test]
    fn test_split_on_reports_offsets() {
        let pieces: Vec<(usize, &str)> = split_on("ab--cd----e", "--").collect();
        assert_eq!(pieces, vec![(0, "ab"), (4, "cd"), (8, ""), (10, "e")]);

        let chars: Vec<(usize, &str)> = split_on("é🎮a", "").collect();
        assert_eq!(chars, vec![(0, "é"), (2, "🎮"), (6, "a")]);
    }

    #[test]
    fn test_unicode_text() {
        let splitter = RecursiveCharacterSplitter::new([" ", ""], 6, 0).unwrap();
        let chunks = splitter.split_text("héllo wörld 🎮🎮🎮🎮🎮🎮🎮");
        assert_eq!(chunks, vec!["héllo", "wörld", "🎮🎮🎮🎮🎮🎮", "🎮"]);
    }
}
