//! Run-level reporting for the batch pipeline.

use serde::Serialize;

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every document processed with no failures.
    Success,
    /// The run completed but some documents or chunks failed.
    Partial,
    /// Nothing was embedded at all.
    Failed,
    /// The run was cancelled between documents.
    Cancelled,
}

/// Stage at which a recorded failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Extraction,
    Embedding,
    Sink,
}

/// One isolated failure. `chunk_index` is set for embedding failures only.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<u32>,
    pub stage: FailureStage,
    pub message: String,
    /// Whether re-running the same input could plausibly succeed.
    pub retryable: bool,
}

/// Aggregate counters for one pipeline invocation. Reset each run; nothing
/// here survives the process.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub files_seen: u64,
    /// Documents with every chunk embedded.
    pub processed_files: u64,
    /// Documents where some, but not all, chunks embedded.
    pub partial_files: u64,
    /// Documents that produced no embedded chunks.
    pub failed_files: u64,
    pub total_chunks: u64,
    pub total_chunks_embedded: u64,
    pub rows_persisted: u64,
    pub duration_ms: u64,
    pub failures: Vec<Failure>,
}

impl RunReport {
    pub fn new(files_seen: u64) -> Self {
        Self {
            status: RunStatus::Success,
            files_seen,
            processed_files: 0,
            partial_files: 0,
            failed_files: 0,
            total_chunks: 0,
            total_chunks_embedded: 0,
            rows_persisted: 0,
            duration_ms: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(
        &mut self,
        file_name: &str,
        chunk_index: Option<u32>,
        stage: FailureStage,
        message: String,
        retryable: bool,
    ) {
        self.failures.push(Failure {
            file_name: file_name.to_string(),
            chunk_index,
            stage,
            message,
            retryable,
        });
    }

    /// Settle the terminal status once the document loop has finished.
    pub fn finalize(&mut self, cancelled: bool, duration_ms: u64) {
        self.duration_ms = duration_ms;
        self.status = if cancelled {
            RunStatus::Cancelled
        } else if self.failures.is_empty() {
            RunStatus::Success
        } else if self.total_chunks_embedded == 0 && self.processed_files == 0 {
            RunStatus::Failed
        } else {
            RunStatus::Partial
        };
    }
}
