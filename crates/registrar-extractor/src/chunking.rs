//! Text chunking strategies
//!
//! Sizes are counted in characters, never bytes, so multi-byte text is never
//! cut inside a code point.

use crate::config::ChunkStrategy;
use std::collections::VecDeque;

/// Separators tried in order; the empty one is the hard character cut
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Chunks text according to the specified strategy
#[derive(Debug, Clone)]
pub struct TextChunker {
    strategy: ChunkStrategy,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a new text chunker
    ///
    /// A zero size is raised to 1 and the overlap is capped below the size.
    pub fn new(strategy: ChunkStrategy, chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            strategy,
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Chunk the given text
    ///
    /// Every returned chunk is trimmed and non-empty. Blank input yields no
    /// chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        match self.strategy {
            ChunkStrategy::Recursive => self.split_recursive(text, &SEPARATORS),
            ChunkStrategy::Paragraph => split_paragraphs(text),
        }
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let remaining = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) <= self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if remaining.is_empty() {
                push_trimmed(&mut chunks, piece);
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    /// Greedily merge pieces up to `chunk_size`, carrying an overlap tail
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &join(&window));

                while let Some(&(_, front_len)) = window.front() {
                    if total > self.chunk_overlap || total + len > self.chunk_size {
                        window.pop_front();
                        total -= front_len;
                    } else {
                        break;
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        if !window.is_empty() {
            push_trimmed(&mut chunks, &join(&window));
        }

        chunks
    }
}

/// One segment per run of non-blank lines
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                push_trimmed(&mut paragraphs, &current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        push_trimmed(&mut paragraphs, &current.join("\n"));
    }

    paragraphs
}

fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        text.char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect()
    } else {
        text.split_inclusive(separator).collect()
    }
}

fn join(window: &VecDeque<(&str, usize)>) -> String {
    window.iter().map(|(piece, _)| *piece).collect()
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn recursive(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(ChunkStrategy::Recursive, size, overlap)
    }

    #[test]
    fn test_no_chunking_needed_for_small_text() {
        let chunks = recursive(100, 10).chunk("Short text here.");
        assert_eq!(chunks, vec!["Short text here."]);
    }

    #[test]
    fn test_empty_text() {
        assert!(recursive(100, 10).chunk("").is_empty());
        assert!(recursive(100, 10).chunk("  \n\n  ").is_empty());
        assert!(TextChunker::new(ChunkStrategy::Paragraph, 100, 0)
            .chunk("\n\n")
            .is_empty());
    }

    #[test]
    fn test_paragraphs_merged_until_limit() {
        let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
        let chunks = recursive(50, 0).chunk(text);
        assert_eq!(
            chunks,
            vec![
                "First paragraph here.\n\nSecond paragraph here.",
                "Third paragraph here."
            ]
        );
    }

    #[test]
    fn test_overlap_carries_tail_into_next_chunk() {
        let chunks = recursive(10, 4).chunk("aaa bbb ccc ddd");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
    }

    #[test]
    fn test_long_word_falls_back_to_character_cut() {
        let text = "a".repeat(25);
        let chunks = recursive(10, 0).chunk(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn test_sizes_are_counted_in_characters() {
        let text = "é".repeat(12);
        let chunks = recursive(5, 0).chunk(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_paragraph_strategy_splits_on_blank_lines() {
        let chunker = TextChunker::new(ChunkStrategy::Paragraph, 10, 0);
        let text = "Acme Corp was founded in 2005 by Alice and Bob.\n\n\n   \nJust a sentence\nwith no company.\n";
        let chunks = chunker.chunk(text);
        assert_eq!(
            chunks,
            vec![
                "Acme Corp was founded in 2005 by Alice and Bob.",
                "Just a sentence\nwith no company."
            ]
        );
    }

    #[test]
    fn test_overlap_capped_below_size() {
        let chunker = TextChunker::new(ChunkStrategy::Recursive, 5, 50);
        assert_eq!(chunker.chunk_overlap, 4);
        let chunker = TextChunker::new(ChunkStrategy::Recursive, 0, 0);
        assert_eq!(chunker.chunk_size, 1);
    }

    fn non_whitespace(text: &str) -> usize {
        text.chars().filter(|c| !c.is_whitespace()).count()
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded_and_non_empty(
            text in "[a-zé .\n]{0,400}",
            size in 1usize..60,
            overlap_ratio in 0usize..100,
        ) {
            let overlap = size * overlap_ratio / 100;
            let chunks = recursive(size, overlap).chunk(&text);
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.trim(), chunk.as_str());
                prop_assert!(chunk.chars().count() <= size);
                prop_assert!(text.contains(chunk.as_str()));
            }
        }

        #[test]
        fn prop_chunks_cover_all_content(text in "[a-z .\n]{0,400}", size in 1usize..60) {
            let chunks = recursive(size, 0).chunk(&text);
            let covered: usize = chunks.iter().map(|c| non_whitespace(c)).sum();
            prop_assert!(covered >= non_whitespace(&text));
        }

        #[test]
        fn prop_chunking_is_deterministic(text in "[a-z .\n]{0,300}", size in 1usize..40) {
            let chunker = recursive(size, size / 3);
            prop_assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
        }
    }
}
