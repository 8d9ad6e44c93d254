//! Append-only CSV sink.
//!
//! Produces the fixed three-column layout `metadata,content,embedding` with
//! the embedding serialized as a JSON array string, so rows can later be
//! re-uploaded to Postgres with `pdfembed upload`.

use std::fs::OpenOptions;
use std::path::PathBuf;

use async_trait::async_trait;

use super::Sink;
use crate::error::SinkError;
use crate::models::{EmbeddedRecord, SinkConfig};

pub const CSV_HEADER: [&str; 3] = ["metadata", "content", "embedding"];

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(config: &SinkConfig) -> Self {
        Self {
            path: config.csv_path.clone(),
        }
    }

    fn open_writer(&self) -> Result<(csv::Writer<std::fs::File>, bool), SinkError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        Ok((writer, needs_header))
    }
}

#[async_trait]
impl Sink for CsvSink {
    async fn health_check(&self) -> Result<bool, SinkError> {
        let (mut writer, _) = self.open_writer()?;
        writer.flush()?;
        Ok(true)
    }

    async fn persist(&self, records: &[EmbeddedRecord]) -> Result<u64, SinkError> {
        if records.is_empty() {
            return Ok(0);
        }

        let (mut writer, needs_header) = self.open_writer()?;
        if needs_header {
            writer.write_record(CSV_HEADER)?;
        }

        let mut written = 0u64;
        for record in records {
            let metadata = serde_json::to_string(&record.metadata)?;
            let embedding = serde_json::to_string(&record.embedding)?;
            match writer.write_record([
                metadata.as_str(),
                record.content.as_str(),
                embedding.as_str(),
            ]) {
                Ok(()) => written += 1,
                Err(e) => {
                    eprintln!(
                        "warning: skipping record for {}: {}",
                        record.metadata["file_name"].as_str().unwrap_or("?"),
                        e
                    );
                }
            }
        }

        writer.flush()?;
        Ok(written)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}
