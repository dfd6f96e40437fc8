//! Text chunking for TTS processing.
//!
//! Text is split recursively on a priority list of separators (paragraph,
//! line, sentence end, word, character) and the pieces are merged back into
//! chunks of at most `max_length` characters. Consecutive chunks share up to
//! [`CHUNK_OVERLAP`] characters so a listener crossing a file boundary hears
//! the tail of the previous part again.
//!
//! Separators stay attached to the front of the piece that follows them and
//! every chunk is a trimmed, contiguous slice of the input.

use super::TextChunk;
use std::collections::VecDeque;
use std::ops::Range;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_LENGTH: usize = 5000;

/// Characters repeated between adjacent chunks.
pub const CHUNK_OVERLAP: usize = 100;

/// Break points in order of preference. The empty separator splits between
/// characters and is always tried last.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " ", ""];

/// Split text into TTS-friendly chunks.
///
/// Returns an empty list for empty or whitespace-only input.
pub fn split_text(text: &str, max_length: usize) -> Vec<String> {
    chunk_spans(text, max_length)
        .into_iter()
        .map(|span| text[span].to_string())
        .collect()
}

/// Split text into indexed chunks that remember where they were cut from.
pub fn chunk_text(text: &str, max_length: usize) -> Vec<TextChunk> {
    chunk_spans(text, max_length)
        .into_iter()
        .enumerate()
        .map(|(index, span)| TextChunk::new(index, text[span.clone()].to_string(), span))
        .collect()
}

/// Number of chunks `text` splits into, without copying any of them.
pub fn chunk_count(text: &str, max_length: usize) -> usize {
    chunk_spans(text, max_length).len()
}

fn chunk_spans(text: &str, max_length: usize) -> Vec<Range<usize>> {
    let max_length = max_length.max(1);
    let splitter = Splitter {
        source: text,
        max_length,
        overlap: CHUNK_OVERLAP.min(max_length / 2),
    };

    let mut spans = Vec::new();
    splitter.split(Piece::new(text, 0, text.len()), SEPARATORS, &mut spans);
    spans
}

/// A contiguous byte range of the source text.
#[derive(Debug, Clone, Copy)]
struct Piece {
    start: usize,
    end: usize,
    chars: usize,
}

impl Piece {
    fn new(source: &str, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            chars: source[start..end].chars().count(),
        }
    }
}

struct Splitter<'a> {
    source: &'a str,
    max_length: usize,
    overlap: usize,
}

impl Splitter<'_> {
    fn split(&self, piece: Piece, separators: &'static [&'static str], out: &mut Vec<Range<usize>>) {
        let text = &self.source[piece.start..piece.end];
        let (separator, remaining) = choose_separator(text, separators);

        let mut fitting = Vec::new();
        for part in self.split_on(piece, separator) {
            if part.chars < self.max_length {
                fitting.push(part);
                continue;
            }

            if !fitting.is_empty() {
                self.merge(&fitting, out);
                fitting.clear();
            }

            if remaining.is_empty() {
                // Nothing finer to split on; emit as is
                self.push_trimmed(part.start, part.end, out);
            } else {
                self.split(part, remaining, out);
            }
        }

        if !fitting.is_empty() {
            self.merge(&fitting, out);
        }
    }

    /// Cut `piece` before every occurrence of `separator`.
    fn split_on(&self, piece: Piece, separator: &str) -> Vec<Piece> {
        let text = &self.source[piece.start..piece.end];

        if separator.is_empty() {
            return text
                .char_indices()
                .map(|(i, c)| Piece {
                    start: piece.start + i,
                    end: piece.start + i + c.len_utf8(),
                    chars: 1,
                })
                .collect();
        }

        let mut parts = Vec::new();
        let mut last = 0;
        for (idx, _) in text.match_indices(separator) {
            if idx > last {
                parts.push(Piece::new(self.source, piece.start + last, piece.start + idx));
            }
            last = idx;
        }
        if last < text.len() {
            parts.push(Piece::new(self.source, piece.start + last, piece.end));
        }
        parts
    }

    /// Greedily pack adjacent pieces into chunks, carrying a tail of each
    /// chunk into the next one.
    fn merge(&self, parts: &[Piece], out: &mut Vec<Range<usize>>) {
        let mut window: VecDeque<Piece> = VecDeque::new();
        let mut total = 0;

        for &part in parts {
            if total + part.chars > self.max_length && !window.is_empty() {
                self.push_window(&window, out);

                while total > self.overlap || (total + part.chars > self.max_length && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= front.chars,
                        None => break,
                    }
                }
            }

            window.push_back(part);
            total += part.chars;
        }

        self.push_window(&window, out);
    }

    fn push_window(&self, window: &VecDeque<Piece>, out: &mut Vec<Range<usize>>) {
        if let (Some(first), Some(last)) = (window.front(), window.back()) {
            self.push_trimmed(first.start, last.end, out);
        }
    }

    fn push_trimmed(&self, start: usize, end: usize, out: &mut Vec<Range<usize>>) {
        let text = &self.source[start..end];
        let trimmed_start = start + (text.len() - text.trim_start().len());
        let trimmed_end = start + text.trim_end().len();

        if trimmed_start >= trimmed_end {
            return;
        }

        // A window that only gained whitespace repeats the previous chunk
        if let Some(last) = out.last() {
            if last.start <= trimmed_start && trimmed_end <= last.end {
                return;
            }
        }

        out.push(trimmed_start..trimmed_end);
    }
}

/// Pick the first separator present in `text`, returning it with the
/// separators still available for further splitting.
fn choose_separator(
    text: &str,
    separators: &'static [&'static str],
) -> (&'static str, &'static [&'static str]) {
    for (i, &separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}
