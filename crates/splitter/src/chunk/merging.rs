//! Greedy packing of short pieces into overlapping chunks.

use super::{SplitDiagnostic, SplitOutcome};
use std::collections::VecDeque;

impl SplitOutcome {
    /// Append a finished chunk, flagging it when it exceeds `chunk_size`.
    pub(crate) fn push_chunk(&mut self, text: String, length: usize, chunk_size: usize) {
        if length > chunk_size {
            let diagnostic = SplitDiagnostic::OversizedChunk {
                index: self.chunks.len(),
                length,
                chunk_size,
            };
            tracing::warn!("{}", diagnostic);
            self.diagnostics.push(diagnostic);
        }
        self.chunks.push(text);
    }
}

/// Pack `pieces` (each shorter than `chunk_size`) into chunks joined by
/// `separator`.
///
/// The window slides forward: once a chunk is emitted, pieces are evicted
/// from the front until at most `chunk_overlap` characters remain and the
/// next piece fits. The surviving tail starts the next chunk.
pub(crate) fn merge_splits<'a>(
    pieces: impl IntoIterator<Item = &'a str>,
    separator: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    outcome: &mut SplitOutcome,
) {
    let separator_len = separator.chars().count();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    // Characters in the window including one separator per internal join.
    let mut total = 0usize;

    for piece in pieces {
        let len = piece.chars().count();
        let join_cost = if window.is_empty() { 0 } else { separator_len };

        if !window.is_empty() && total + join_cost + len > chunk_size {
            outcome.push_chunk(join(&window, separator), total, chunk_size);

            while let Some(&(_, front_len)) = window.front() {
                let fits_next = total + separator_len + len <= chunk_size;
                if total <= chunk_overlap && (fits_next || total == 0) {
                    break;
                }
                window.pop_front();
                total -= front_len + if window.is_empty() { 0 } else { separator_len };
            }
        }

        total += len + if window.is_empty() { 0 } else { separator_len };
        window.push_back((piece, len));
    }

    if !window.is_empty() {
        outcome.push_chunk(join(&window, separator), total, chunk_size);
    }
}

fn join(window: &VecDeque<(&str, usize)>, separator: &str) -> String {
    let mut joined = String::new();
    for (i, &(piece, _)) in window.iter().enumerate() {
        if i > 0 {
            joined.push_str(separator);
        }
        joined.push_str(piece);
    }
    joined
}
