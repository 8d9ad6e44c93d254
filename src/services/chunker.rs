//! Fixed-size overlapping windows over normalized text.

use crate::models::{ChunkingConfig, DocumentChunk};

/// Splits document text into chunks of `chunk_size` characters where
/// consecutive chunks share exactly `overlap_size` characters. The final
/// chunk may be shorter.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap_size: usize,
}

impl TextChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            overlap_size: config.overlap_size,
        }
    }

    /// Chunk `text` for the named document. Offsets are in characters, so
    /// multi-byte content windows the same way ASCII does.
    ///
    /// Empty text yields no chunks; text no longer than `chunk_size` yields a
    /// single chunk equal to the whole text.
    pub fn chunk(&self, file_name: &str, text: &str) -> Vec<DocumentChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if total == 0 {
            return Vec::new();
        }

        // Config validation guarantees chunk_size > overlap_size; the
        // fallback keeps the cursor advancing even on a bad hand-built config.
        let step = if self.chunk_size > self.overlap_size {
            self.chunk_size - self.overlap_size
        } else {
            self.chunk_size
        };

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total {
            let end = (start + self.chunk_size).min(total);
            let content: String = chars[start..end].iter().collect();
            chunks.push(DocumentChunk::new(
                file_name,
                chunks.len() as u32,
                content,
                start as u64,
                end as u64,
            ));

            // Reached the end of the text; advancing further would only
            // re-emit the tail.
            if end == total {
                break;
            }
            start += step;
        }

        chunks
    }
}
