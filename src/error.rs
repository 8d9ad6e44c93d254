//! Error types for the embedding pipeline.

use thiserror::Error;

/// Determines whether a failed operation is worth re-running.
///
/// The pipeline never retries within a run; this classification is carried on
/// the run report so a caller re-invoking the run knows which inputs can
/// plausibly succeed next time.
pub trait Retryable {
    /// Returns true if the same operation could succeed on a later attempt.
    fn is_retryable(&self) -> bool;
}

/// Errors raised while obtaining text from a source document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read source file: {0}")]
    ReadError(String),

    #[error("failed to parse PDF: {0}")]
    ParseError(String),

    #[error("no text extracted from document")]
    EmptyText,
}

impl Retryable for ExtractionError {
    fn is_retryable(&self) -> bool {
        // Extraction is deterministic over local bytes; a failed document
        // fails the same way next run.
        false
    }
}

/// Errors raised by the embedding service call.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding service: {0}")]
    ConnectionError(String),

    #[error("embedding service error: {0}")]
    ServiceError(String),

    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding request timed out")]
    Timeout,
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::ConnectionError(_) | EmbeddingError::Timeout => true,
            // Service errors might be transient (e.g., 503 Service Unavailable)
            EmbeddingError::ServiceError(msg) => {
                msg.contains("503")
                    || msg.contains("502")
                    || msg.contains("504")
                    || msg.contains("429")
                    || msg.to_lowercase().contains("unavailable")
                    || msg.to_lowercase().contains("too many requests")
            }
            EmbeddingError::RequestError(e) => e.is_timeout() || e.is_connect(),
            EmbeddingError::InvalidResponse(_) => false,
        }
    }
}

/// Errors raised while persisting embedded records.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("failed to connect to database: {0}")]
    ConnectionError(String),

    #[error("table error: {0}")]
    TableError(String),

    #[error("insert error: {0}")]
    InsertError(String),

    #[error("record serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl Retryable for SinkError {
    fn is_retryable(&self) -> bool {
        match self {
            SinkError::ConnectionError(_) => true,
            SinkError::TableError(msg) | SinkError::InsertError(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("timeout") || msg.contains("connection") || msg.contains("unavailable")
            }
            SinkError::IoError(_) | SinkError::CsvError(_) | SinkError::SerializeError(_) => false,
        }
    }
}

/// Errors related to configuration. All of these are fatal: a run aborts
/// before any document is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("path error: {0}")]
    PathError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("missing API key: set {0} or [embedding].api_key")]
    MissingApiKey(String),

    #[error("no PDF files found in {0}")]
    NoInputFiles(String),
}
