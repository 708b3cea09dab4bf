//! Recursive character chunking for transcripts.
//!
//! Splits on progressively finer separators (blank line, newline, sentence
//! end, word boundary) and only falls back to hard character cuts when a
//! piece has no usable boundary at all. Consecutive chunks share up to
//! `overlap` characters of trailing context.

use std::collections::VecDeque;

/// Separator ladder, coarsest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split text into ordered chunks of at most `chunk_size` characters.
///
/// Consecutive chunks share up to `overlap` characters at their boundary.
/// Returns an empty vector for empty input.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let pieces = split_recursive(text, chunk_size, &SEPARATORS);
    merge_pieces(pieces, chunk_size, overlap)
}

/// Break text into pieces no longer than `chunk_size`, preferring the
/// coarsest separator that produces progress.
fn split_recursive(text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((sep, rest)) = separators.split_first() else {
        return hard_split(text, chunk_size);
    };

    if !text.contains(sep) {
        return split_recursive(text, chunk_size, rest);
    }

    let mut pieces = Vec::new();
    for part in text.split_inclusive(sep) {
        if char_len(part) <= chunk_size {
            pieces.push(part.to_string());
        } else {
            pieces.extend(split_recursive(part, chunk_size, rest));
        }
    }
    pieces
}

/// Character cuts for text with no separator at all.
fn hard_split(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|c| c.iter().collect())
        .collect()
}

/// Greedily pack pieces into chunks, carrying an overlap window between them.
fn merge_pieces(pieces: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<String> = VecDeque::new();
    let mut window_len = 0usize;

    for piece in pieces {
        let piece_len = char_len(&piece);

        if window_len + piece_len > chunk_size && !window.is_empty() {
            push_chunk(&mut chunks, &window);

            // Retain at most `overlap` characters of context, and always
            // make room for the incoming piece.
            while !window.is_empty()
                && (window_len > overlap || window_len + piece_len > chunk_size)
            {
                if let Some(front) = window.pop_front() {
                    window_len -= char_len(&front);
                }
            }
        }

        window_len += piece_len;
        window.push_back(piece);
    }

    if window_len > 0 {
        push_chunk(&mut chunks, &window);
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<String>) {
    let joined: String = window.iter().map(|s| s.as_str()).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(split_text("", 800, 180).is_empty());
        assert!(split_text("   \n  ", 800, 180).is_empty());
    }

    #[test]
    fn test_short_input_is_one_chunk() {
        let chunks = split_text("a short transcript", 800, 180);
        assert_eq!(chunks, vec!["a short transcript".to_string()]);
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let text = "word ".repeat(500);
        let chunks = split_text(&text, 100, 20);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
        }
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text = (0..200)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = split_text(&text, 80, 30);
        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            // The next chunk starts with words carried over from the
            // previous chunk's tail.
            let first_word = pair[1].split_whitespace().next().unwrap();
            assert!(
                pair[0].contains(first_word),
                "expected '{}' to appear in previous chunk",
                first_word
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));
        let chunks = split_text(&text, 80, 0);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].chars().all(|c| c == 'a'));
        assert!(chunks[1].chars().all(|c| c == 'b'));
    }

    #[test]
    fn test_hard_cut_when_no_boundaries() {
        let text = "x".repeat(250);
        let chunks = split_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 100);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn test_order_is_preserved() {
        let text = (0..100)
            .map(|i| format!("token{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = split_text(&text, 120, 0);
        let rejoined = chunks.join(" ");
        let mut last_pos = 0;
        for i in (0..100).step_by(10) {
            let needle = format!("token{} ", i);
            let pos = rejoined[last_pos..].find(&needle).map(|p| p + last_pos);
            assert!(pos.is_some(), "token{} missing or out of order", i);
            last_pos = pos.unwrap();
        }
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let text = "æøå ".repeat(100);
        let chunks = split_text(&text, 50, 10);
        assert!(!chunks.is_empty());
        for chunk in chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }
}
