//! Document-to-record orchestration.
//!
//! One logical worker drives a sequential loop over documents and, within
//! each document, a sequential loop over chunks. Failures are isolated at the
//! narrowest scope that makes sense: a failed extraction skips one document,
//! a failed embed call skips one chunk, a failed row skips one record. Only
//! configuration problems abort a run, and those are rejected before this
//! module is reached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::error::Retryable;
use crate::models::{
    ChunkingConfig, Config, DocumentResult, EmbeddedChunk, EmbeddedRecord, FailureStage,
    RunReport, SourceDocument,
};
use crate::services::chunker::TextChunker;
use crate::services::embedding::Embedder;
use crate::services::extractor::TextExtractor;
use crate::services::normalizer::TextNormalizer;
use crate::services::rate_limit::RateLimiter;
use crate::services::sink::Sink;

/// Per-document outcome handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOutcome {
    Processed,
    Partial,
    Failed,
}

pub struct BatchPipeline {
    extractor: Box<dyn TextExtractor>,
    embedder: Box<dyn Embedder>,
    sink: Box<dyn Sink>,
    normalizer: TextNormalizer,
    chunker: TextChunker,
    limiter: RateLimiter,
    chunking: ChunkingConfig,
}

impl BatchPipeline {
    pub fn new(
        config: &Config,
        extractor: Box<dyn TextExtractor>,
        embedder: Box<dyn Embedder>,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            sink,
            normalizer: TextNormalizer::new(&config.chunking),
            chunker: TextChunker::new(&config.chunking),
            limiter: RateLimiter::new(&config.rate_limit),
            chunking: config.chunking.clone(),
        }
    }

    /// Drive every document through extract → normalize → chunk → embed →
    /// persist and return the aggregate report.
    ///
    /// `cancel` is checked between documents only; once a document has
    /// started it either finishes or fails on its own, so no partial
    /// document result is ever persisted.
    pub async fn run(
        &self,
        documents: Vec<SourceDocument>,
        cancel: &AtomicBool,
        mut on_document: impl FnMut(&SourceDocument, DocumentOutcome),
    ) -> RunReport {
        let started = Instant::now();
        let mut report = RunReport::new(documents.len() as u64);
        let mut cancelled = false;

        for document in documents {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }

            let outcome = self.process_document(&document, &mut report).await;
            match outcome {
                DocumentOutcome::Processed => report.processed_files += 1,
                DocumentOutcome::Partial => report.partial_files += 1,
                DocumentOutcome::Failed => report.failed_files += 1,
            }
            on_document(&document, outcome);
        }

        report.finalize(cancelled, started.elapsed().as_millis() as u64);
        report
    }

    async fn process_document(
        &self,
        document: &SourceDocument,
        report: &mut RunReport,
    ) -> DocumentOutcome {
        let text = match self.extractor.extract(document) {
            Ok(text) => text,
            Err(e) => {
                report.record_failure(
                    &document.file_name,
                    None,
                    FailureStage::Extraction,
                    e.to_string(),
                    e.is_retryable(),
                );
                return DocumentOutcome::Failed;
            }
        };

        let normalized = self.normalizer.normalize(&text);
        let chunks = self.chunker.chunk(&document.file_name, &normalized);
        let total_chunks = chunks.len();
        report.total_chunks += total_chunks as u64;

        let mut embedded = Vec::with_capacity(total_chunks);
        for chunk in chunks {
            self.limiter.acquire().await;

            match self.embedder.embed(&chunk.content).await {
                Ok(embedding) => embedded.push(EmbeddedChunk { chunk, embedding }),
                Err(e) => {
                    report.record_failure(
                        &document.file_name,
                        Some(chunk.chunk_index),
                        FailureStage::Embedding,
                        e.to_string(),
                        e.is_retryable(),
                    );
                }
            }
        }

        report.total_chunks_embedded += embedded.len() as u64;
        let embedded_count = embedded.len();

        let result = DocumentResult {
            file_name: document.file_name.clone(),
            total_chunks,
            embedded,
        };
        self.persist_document(&result, report).await;

        if total_chunks > 0 && embedded_count == 0 {
            DocumentOutcome::Failed
        } else if embedded_count < total_chunks {
            DocumentOutcome::Partial
        } else {
            DocumentOutcome::Processed
        }
    }

    async fn persist_document(&self, result: &DocumentResult, report: &mut RunReport) {
        if result.embedded.is_empty() {
            return;
        }

        let records: Vec<EmbeddedRecord> = result
            .embedded
            .iter()
            .cloned()
            .map(EmbeddedChunk::into_record)
            .collect();

        match self.sink.persist(&records).await {
            Ok(count) => {
                report.rows_persisted += count;
                if (count as usize) < records.len() {
                    report.record_failure(
                        &result.file_name,
                        None,
                        FailureStage::Sink,
                        format!(
                            "{} of {} rows failed to persist",
                            records.len() - count as usize,
                            records.len()
                        ),
                        true,
                    );
                }
            }
            Err(e) => {
                report.record_failure(
                    &result.file_name,
                    None,
                    FailureStage::Sink,
                    e.to_string(),
                    e.is_retryable(),
                );
            }
        }
    }

    /// Configured chunking parameters, for run summaries.
    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }
}
