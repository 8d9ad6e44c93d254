use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::utils::file::calculate_checksum;

/// A PDF file picked up from the input directory. The byte payload is read by
/// the extractor, not here, so an unreadable file fails as one document
/// instead of failing enumeration.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub path: PathBuf,
}

impl SourceDocument {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { file_name, path }
    }
}

/// One window of a document's normalized text. Offsets are in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub file_name: String,
    pub chunk_index: u32,
    pub content: String,
    pub start_offset: u64,
    pub end_offset: u64,
}

impl DocumentChunk {
    pub fn new(
        file_name: &str,
        chunk_index: u32,
        content: String,
        start_offset: u64,
        end_offset: u64,
    ) -> Self {
        Self {
            file_name: file_name.to_string(),
            chunk_index,
            content,
            start_offset,
            end_offset,
        }
    }

    /// Chunk length in characters.
    pub fn len(&self) -> usize {
        (self.end_offset - self.start_offset) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}

/// Metadata attached to every persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub file_name: String,
    pub chunk_index: u32,
    pub length: usize,
    /// SHA-256 of the chunk content. The pipeline does not deduplicate across
    /// runs; this gives a sink that wants to an explicit content key.
    pub checksum: String,
    pub processed_at: String,
}

/// A chunk plus its vector, ready for persistence.
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub chunk: DocumentChunk,
    pub embedding: Vec<f32>,
}

impl EmbeddedChunk {
    pub fn into_record(self) -> EmbeddedRecord {
        let metadata = ChunkMetadata {
            file_name: self.chunk.file_name.clone(),
            chunk_index: self.chunk.chunk_index,
            length: self.chunk.len(),
            checksum: calculate_checksum(&self.chunk.content),
            processed_at: chrono::Utc::now().to_rfc3339(),
        };
        EmbeddedRecord {
            content: self.chunk.content,
            embedding: self.embedding,
            metadata: serde_json::json!(metadata),
        }
    }
}

/// The record shape every sink accepts. Metadata is an arbitrary JSON value
/// so re-uploaded rows with foreign metadata pass through unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedRecord {
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: serde_json::Value,
}

/// Everything produced for one source document within a run.
#[derive(Debug)]
pub struct DocumentResult {
    pub file_name: String,
    pub total_chunks: usize,
    pub embedded: Vec<EmbeddedChunk>,
}
