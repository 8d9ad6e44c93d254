//! End-to-end pipeline tests with mock collaborators.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pdfembed::error::{EmbeddingError, ExtractionError, SinkError};
use pdfembed::models::{
    ChunkingConfig, Config, EmbeddedRecord, FailureStage, RateLimitConfig, RunStatus,
    SourceDocument,
};
use pdfembed::services::{BatchPipeline, Embedder, Sink, TextExtractor};

/// Extractor returning canned text keyed by file name.
struct MockExtractor {
    texts: HashMap<String, Option<String>>,
}

impl MockExtractor {
    fn new(entries: &[(&str, Option<&str>)]) -> Self {
        Self {
            texts: entries
                .iter()
                .map(|(name, text)| (name.to_string(), text.map(str::to_string)))
                .collect(),
        }
    }
}

impl TextExtractor for MockExtractor {
    fn extract(&self, document: &SourceDocument) -> Result<String, ExtractionError> {
        match self.texts.get(&document.file_name) {
            Some(Some(text)) => Ok(text.clone()),
            Some(None) => Err(ExtractionError::ParseError("corrupt xref table".into())),
            None => Err(ExtractionError::ReadError("no such file".into())),
        }
    }
}

/// Embedder producing a fixed-dimensionality vector, failing on the call
/// indices it is told to fail on.
struct MockEmbedder {
    calls: AtomicU32,
    fail_calls: Vec<u32>,
}

impl MockEmbedder {
    fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_calls: Vec::new(),
        }
    }

    fn failing_on(fail_calls: &[u32]) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_calls: fail_calls.to_vec(),
        }
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_calls.contains(&call) {
            return Err(EmbeddingError::ServiceError("status 503: overloaded".into()));
        }
        Ok(vec![text.chars().count() as f32, 0.5, -0.5])
    }
}

/// Sink capturing records in memory; optionally fails whole batches.
#[derive(Clone)]
struct MemorySink {
    records: Arc<Mutex<Vec<EmbeddedRecord>>>,
    fail_batches: bool,
}

impl MemorySink {
    fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail_batches: false,
        }
    }

    fn failing() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail_batches: true,
        }
    }

    fn records(&self) -> Vec<EmbeddedRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn health_check(&self) -> Result<bool, SinkError> {
        Ok(!self.fail_batches)
    }

    async fn persist(&self, records: &[EmbeddedRecord]) -> Result<u64, SinkError> {
        if self.fail_batches {
            return Err(SinkError::ConnectionError("connection refused".into()));
        }
        let mut stored = self.records.lock().unwrap();
        stored.extend_from_slice(records);
        Ok(records.len() as u64)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Unique text of `len` characters with no repeats, no punctuation and no
/// whitespace, so normalization passes it through unchanged.
fn unique_text(len: usize) -> String {
    let alphabet = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut out = String::with_capacity(len + 1);
    let mut i = 0usize;
    while out.len() < len {
        out.push(alphabet.as_bytes()[i % alphabet.len()] as char);
        out.push(alphabet.as_bytes()[(i / alphabet.len()) % alphabet.len()] as char);
        i += 1;
    }
    out.truncate(len);
    out
}

fn test_config(chunk_size: usize, overlap_size: usize) -> Config {
    let mut config = Config::default();
    config.chunking = ChunkingConfig {
        chunk_size,
        overlap_size,
        min_sentence_length: 10,
    };
    // Keep tests fast: a wide-open window and no pacing delay.
    config.rate_limit = RateLimitConfig {
        max_requests_per_window: 10_000,
        window_duration_ms: 60_000,
        inter_request_delay_ms: 0,
    };
    config
}

fn documents(names: &[&str]) -> Vec<SourceDocument> {
    names
        .iter()
        .map(|name| SourceDocument::new(PathBuf::from(format!("/pdfs/{}", name))))
        .collect()
}

fn pipeline(
    config: &Config,
    extractor: MockExtractor,
    embedder: MockEmbedder,
    sink: MemorySink,
) -> BatchPipeline {
    BatchPipeline::new(
        config,
        Box::new(extractor),
        Box::new(embedder),
        Box::new(sink),
    )
}

#[tokio::test]
async fn end_to_end_chunk_counts_and_report() {
    let text_a = unique_text(800);
    let text_b = unique_text(2200);
    let config = test_config(1000, 150);
    let sink = MemorySink::new();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("a.pdf", Some(&text_a)), ("b.pdf", Some(&text_b))]),
        MockEmbedder::new(),
        sink.clone(),
    );

    let cancel = AtomicBool::new(false);
    let report = pipeline
        .run(documents(&["a.pdf", "b.pdf"]), &cancel, |_, _| {})
        .await;

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.files_seen, 2);
    assert_eq!(report.processed_files, 2);
    assert_eq!(report.total_chunks, 4);
    assert_eq!(report.total_chunks_embedded, 4);
    assert_eq!(report.rows_persisted, 4);
    assert!(report.failures.is_empty());

    let records = sink.records();
    assert_eq!(records.len(), 4);

    // Document A: one chunk equal to the whole text.
    assert_eq!(records[0].content, text_a);
    assert_eq!(records[0].metadata["file_name"], "a.pdf");
    assert_eq!(records[0].metadata["length"], 800);

    // Document B: windows 0-1000, 850-1850, 1700-2200.
    let b_text: Vec<char> = text_b.chars().collect();
    let window = |start: usize, end: usize| b_text[start..end].iter().collect::<String>();
    assert_eq!(records[1].content, window(0, 1000));
    assert_eq!(records[2].content, window(850, 1850));
    assert_eq!(records[3].content, window(1700, 2200));
    assert_eq!(records[3].metadata["length"], 500);
}

#[tokio::test]
async fn failed_extraction_isolates_one_document() {
    let text = unique_text(500);
    let config = test_config(1000, 150);
    let sink = MemorySink::new();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("bad.pdf", None), ("good.pdf", Some(&text))]),
        MockEmbedder::new(),
        sink.clone(),
    );

    let cancel = AtomicBool::new(false);
    let report = pipeline
        .run(documents(&["bad.pdf", "good.pdf"]), &cancel, |_, _| {})
        .await;

    assert_eq!(report.status, RunStatus::Partial);
    assert_eq!(report.processed_files, 1);
    assert_eq!(report.failed_files, 1);
    assert_eq!(report.total_chunks, 1);
    assert_eq!(report.total_chunks_embedded, 1);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].file_name, "bad.pdf");
    assert_eq!(report.failures[0].stage, FailureStage::Extraction);
    assert!(!report.failures[0].retryable);

    // The failed document contributed nothing to the sink.
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].metadata["file_name"], "good.pdf");
}

#[tokio::test]
async fn failed_chunk_leaves_partial_document() {
    // 5 chunks of 100 chars each, no overlap; the third embed call fails.
    let text = unique_text(500);
    let config = test_config(100, 0);
    let sink = MemorySink::new();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("doc.pdf", Some(&text))]),
        MockEmbedder::failing_on(&[2]),
        sink.clone(),
    );

    let cancel = AtomicBool::new(false);
    let report = pipeline
        .run(documents(&["doc.pdf"]), &cancel, |_, _| {})
        .await;

    assert_eq!(report.status, RunStatus::Partial);
    assert_eq!(report.partial_files, 1);
    assert_eq!(report.total_chunks, 5);
    assert_eq!(report.total_chunks_embedded, 4);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, FailureStage::Embedding);
    assert_eq!(report.failures[0].chunk_index, Some(2));
    assert!(report.failures[0].retryable);

    let indices: Vec<u64> = sink
        .records()
        .iter()
        .map(|r| r.metadata["chunk_index"].as_u64().unwrap())
        .collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
}

#[tokio::test]
async fn sink_failure_does_not_abort_run() {
    let text_a = unique_text(300);
    let text_b = unique_text(400);
    let config = test_config(1000, 150);
    let sink = MemorySink::failing();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("a.pdf", Some(&text_a)), ("b.pdf", Some(&text_b))]),
        MockEmbedder::new(),
        sink.clone(),
    );

    let cancel = AtomicBool::new(false);
    let report = pipeline
        .run(documents(&["a.pdf", "b.pdf"]), &cancel, |_, _| {})
        .await;

    // Embedding succeeded everywhere; persistence failed everywhere.
    assert_eq!(report.status, RunStatus::Partial);
    assert_eq!(report.processed_files, 2);
    assert_eq!(report.total_chunks_embedded, 2);
    assert_eq!(report.rows_persisted, 0);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().all(|f| f.stage == FailureStage::Sink));
}

#[tokio::test]
async fn persisted_rows_never_exceed_embedded_chunks() {
    let text = unique_text(2200);
    let config = test_config(1000, 150);
    let sink = MemorySink::new();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("doc.pdf", Some(&text))]),
        MockEmbedder::failing_on(&[1]),
        sink.clone(),
    );

    let cancel = AtomicBool::new(false);
    let report = pipeline
        .run(documents(&["doc.pdf"]), &cancel, |_, _| {})
        .await;

    assert!(report.rows_persisted <= report.total_chunks_embedded);
    assert_eq!(report.rows_persisted, 2);
    assert_eq!(sink.records().len(), 2);
}

#[tokio::test]
async fn cancellation_stops_before_next_document() {
    let text = unique_text(500);
    let config = test_config(1000, 150);
    let sink = MemorySink::new();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("a.pdf", Some(&text)), ("b.pdf", Some(&text))]),
        MockEmbedder::new(),
        sink.clone(),
    );

    let cancel = AtomicBool::new(true);
    let mut seen = 0u32;
    let report = pipeline
        .run(documents(&["a.pdf", "b.pdf"]), &cancel, |_, _| seen += 1)
        .await;

    assert_eq!(report.status, RunStatus::Cancelled);
    assert_eq!(report.files_seen, 2);
    assert_eq!(report.processed_files, 0);
    assert_eq!(seen, 0);
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn all_chunks_failing_marks_document_failed() {
    let text = unique_text(150);
    let config = test_config(100, 0);
    let sink = MemorySink::new();
    let pipeline = pipeline(
        &config,
        MockExtractor::new(&[("doc.pdf", Some(&text))]),
        MockEmbedder::failing_on(&[0, 1]),
        sink.clone(),
    );

    let cancel = AtomicBool::new(false);
    let report = pipeline
        .run(documents(&["doc.pdf"]), &cancel, |_, _| {})
        .await;

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.failed_files, 1);
    assert_eq!(report.total_chunks, 2);
    assert_eq!(report.total_chunks_embedded, 0);
    assert!(sink.records().is_empty());
}
