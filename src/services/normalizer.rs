//! Sentence-level cleanup of extracted text.
//!
//! PDF extraction tends to repeat headers, footers and boilerplate sentences
//! on every page. The normalizer splits text into sentence-like segments,
//! drops segments below a minimum length, and keeps only the first occurrence
//! of each distinct segment.
//!
//! The boundary rule is "sentence-ending punctuation followed by whitespace".
//! That is a heuristic, not a tokenizer: consecutive abbreviations or unusual
//! punctuation may under- or over-split. Accepted as-is.

use std::collections::HashSet;

use regex::Regex;

use crate::models::ChunkingConfig;

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    boundary: Regex,
    min_sentence_length: usize,
}

impl TextNormalizer {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            boundary: Regex::new(r"[.!?]\s+").expect("sentence boundary pattern is valid"),
            min_sentence_length: config.min_sentence_length,
        }
    }

    /// Deduplicate sentence-like segments, preserving first-seen order.
    ///
    /// Matching is exact and case-sensitive after trimming. Segments shorter
    /// than the minimum length are dropped outright. Survivors are re-joined
    /// with single spaces. Empty input produces empty output, and the whole
    /// operation is idempotent.
    pub fn normalize(&self, text: &str) -> String {
        let mut seen = HashSet::new();
        let mut kept: Vec<&str> = Vec::new();

        for segment in self.split_sentences(text) {
            let trimmed = segment.trim();
            if trimmed.chars().count() < self.min_sentence_length {
                continue;
            }
            if seen.insert(trimmed.to_string()) {
                kept.push(trimmed);
            }
        }

        kept.join(" ")
    }

    /// Split at `[.!?]` + whitespace, keeping the punctuation with the
    /// segment it ends.
    fn split_sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut segments = Vec::new();
        let mut last = 0;

        for m in self.boundary.find_iter(text) {
            // The punctuation byte is ASCII, so start + 1 is a char boundary.
            let end = m.start() + 1;
            segments.push(&text[last..end]);
            last = m.end();
        }

        if last < text.len() {
            segments.push(&text[last..]);
        }

        segments
    }
}
