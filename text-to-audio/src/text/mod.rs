//! Text processing for TTS: chunking, output naming, and statistics.

pub mod chunker;
pub mod filename;

pub use chunker::{DEFAULT_MAX_LENGTH, chunk_count, chunk_text, split_text};
pub use filename::{sanitize_filename, sanitize_filename_at};

use std::ops::Range;

/// A chunk of text ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the sequence (0-based)
    pub index: usize,
    /// The text content
    pub text: String,
    /// Byte range of `text` within the source it was cut from
    pub span: Range<usize>,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String, span: Range<usize>) -> Self {
        Self { index, text, span }
    }
}

/// Rough size figures shown before converting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.split('\n').count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_chunk_creation() {
        let chunk = TextChunk::new(1, "Hello world".to_string(), 6..17);
        assert_eq!(chunk.index, 1);
        assert_eq!(chunk.text, "Hello world");
        assert_eq!(chunk.span, 6..17);
    }

    #[test]
    fn test_text_stats() {
        let stats = TextStats::of("Hello world.\nSecond line here\n");
        assert_eq!(stats.characters, 30);
        assert_eq!(stats.words, 5);
        assert_eq!(stats.lines, 3);
    }

    #[test]
    fn test_text_stats_empty() {
        let stats = TextStats::of("");
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.words, 0);
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn test_text_stats_counts_characters_not_bytes() {
        assert_eq!(TextStats::of("café").characters, 4);
    }
}
