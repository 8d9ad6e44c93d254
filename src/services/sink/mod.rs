//! Persistence backends for embedded records.
//!
//! This module provides a trait-based abstraction over the two destinations
//! (append-only CSV file, pgvector-backed Postgres table) so the pipeline is
//! agnostic to where records land.

mod csv;
mod postgres;

pub use csv::CsvSink;
pub use postgres::PostgresSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::models::{EmbeddedRecord, SinkConfig, SinkDriver};

/// Abstract destination for embedded records.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Check that the destination is reachable and writable.
    async fn health_check(&self) -> Result<bool, SinkError>;

    /// Persist records, returning how many were actually written.
    ///
    /// A failure on an individual record skips that record and continues;
    /// only a destination-level failure (file unwritable, connection lost
    /// before anything was attempted) surfaces as an error.
    async fn persist(&self, records: &[EmbeddedRecord]) -> Result<u64, SinkError>;

    /// Human-readable destination description for status output.
    fn describe(&self) -> String;
}

/// Create a sink backend based on configuration. The embedding dimension is
/// only consulted by the Postgres backend, for the vector column type.
pub async fn create_sink(
    config: &SinkConfig,
    embedding_dim: u32,
) -> Result<Box<dyn Sink>, SinkError> {
    match config.driver {
        SinkDriver::Csv => Ok(Box::new(CsvSink::new(config))),
        SinkDriver::Postgres => Ok(Box::new(PostgresSink::new(config, embedding_dim).await?)),
    }
}
