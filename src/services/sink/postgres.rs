use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::Sink;
use crate::error::SinkError;
use crate::models::{EmbeddedRecord, SinkConfig};

/// Sink inserting into a pgvector-backed table of
/// `(content, embedding, metadata)` rows.
pub struct PostgresSink {
    pool: PgPool,
    table: String,
    embedding_dim: u32,
}

impl PostgresSink {
    pub async fn new(config: &SinkConfig, embedding_dim: u32) -> Result<Self, SinkError> {
        let url = config.database_url.as_ref().ok_or_else(|| {
            SinkError::ConnectionError("database_url is not configured".to_string())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max)
            .acquire_timeout(Duration::from_secs(config.pool_acquire_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| SinkError::ConnectionError(e.to_string()))?;

        let sink = Self {
            pool,
            table: config.table.clone(),
            embedding_dim,
        };

        sink.check_pgvector_extension().await?;
        sink.ensure_table().await?;

        Ok(sink)
    }

    async fn check_pgvector_extension(&self) -> Result<(), SinkError> {
        let result: Option<(String,)> =
            sqlx::query_as("SELECT extname FROM pg_extension WHERE extname = 'vector'")
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| SinkError::TableError(e.to_string()))?;

        if result.is_none() {
            return Err(SinkError::TableError(
                "pgvector extension is not installed. Run: CREATE EXTENSION vector;".to_string(),
            ));
        }

        Ok(())
    }

    async fn ensure_table(&self) -> Result<(), SinkError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                content TEXT NOT NULL,
                embedding vector({}) NOT NULL,
                metadata JSONB
            )
            "#,
            self.table, self.embedding_dim
        );

        sqlx::query(&create_table)
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::TableError(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl Sink for PostgresSink {
    async fn health_check(&self) -> Result<bool, SinkError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| SinkError::ConnectionError(e.to_string()))
    }

    async fn persist(&self, records: &[EmbeddedRecord]) -> Result<u64, SinkError> {
        if records.is_empty() {
            return Ok(0);
        }

        let query = format!(
            "INSERT INTO {} (content, embedding, metadata) VALUES ($1, $2, $3)",
            self.table
        );

        // No transaction on purpose: a rejected row must not take the rest
        // of the batch down with it.
        let mut inserted = 0u64;
        for record in records {
            let embedding = Vector::from(record.embedding.clone());

            let result = sqlx::query(&query)
                .bind(&record.content)
                .bind(&embedding)
                .bind(&record.metadata)
                .execute(&self.pool)
                .await;

            match result {
                Ok(_) => inserted += 1,
                Err(e) => {
                    eprintln!(
                        "warning: skipping row for {}: {}",
                        record.metadata["file_name"].as_str().unwrap_or("?"),
                        e
                    );
                }
            }
        }

        Ok(inserted)
    }

    fn describe(&self) -> String {
        format!("postgres table {}", self.table)
    }
}
