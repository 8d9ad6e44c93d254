mod config;
mod document;
mod report;

pub use config::{
    API_KEY_ENV, ChunkingConfig, Config, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL,
    DEFAULT_TABLE, EmbeddingConfig, InputConfig, RateLimitConfig, SinkConfig, SinkDriver,
};
pub use document::{
    ChunkMetadata, DocumentChunk, DocumentResult, EmbeddedChunk, EmbeddedRecord, SourceDocument,
};
pub use report::{Failure, FailureStage, RunReport, RunStatus};
