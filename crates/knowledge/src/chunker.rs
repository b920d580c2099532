//! Text chunking with configurable size and overlap.

use crate::types::ChunkSpan;

/// Split text into overlapping spans.
///
/// Character-based windowing: each span is at most `chunk_size` characters
/// and the window advances by `chunk_size - overlap`. Window edges are
/// snapped to UTF-8 boundaries.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkSpan> {
    if text.trim().is_empty() || chunk_size == 0 {
        return vec![];
    }

    let mut spans = Vec::new();
    let mut position = 0u32;
    let mut start = 0;

    // Degenerate overlap would stall the window
    let step = if overlap < chunk_size {
        chunk_size - overlap
    } else {
        chunk_size
    };

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }

        let span_text = text[start..end].trim();

        // Trailing slivers carry no useful context
        if span_text.len() < chunk_size / 10 && position > 0 {
            break;
        }

        if !span_text.is_empty() {
            spans.push(ChunkSpan {
                position,
                text: span_text.to_string(),
            });
            position += 1;
        }

        if end == text.len() {
            break;
        }

        let mut next_start = start + step;
        while next_start < text.len() && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        start = next_start;
    }

    tracing::debug!(
        "Split text into {} spans (size: {}, overlap: {})",
        spans.len(),
        chunk_size,
        overlap
    );

    spans
}
