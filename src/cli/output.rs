use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::models::{RunReport, RunStatus};

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// Machine-parseable JSON format
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub trait Formatter {
    fn format_run_report(&self, report: &RunReport) -> String;
    fn format_upload_report(&self, report: &UploadReport) -> String;
    fn format_status(&self, status: &StatusInfo) -> String;
    fn format_message(&self, message: &str) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Result of re-uploading CSV output to Postgres.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadReport {
    pub files_read: u64,
    pub total_rows: u64,
    pub inserted_rows: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub embedding_url: String,
    pub embedding_model: String,
    pub embedding_reachable: bool,
    pub sink_description: String,
    pub sink_reachable: bool,
    pub input_dir: String,
    pub input_files: u64,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_run_report(&self, report: &RunReport) -> String {
        let mut output = String::new();
        writeln!(output, "Run Complete").unwrap();
        writeln!(output, "------------").unwrap();
        writeln!(output, "Status:          {}", status_label(report.status)).unwrap();
        writeln!(output, "Files seen:      {}", report.files_seen).unwrap();
        writeln!(output, "Files processed: {}", report.processed_files).unwrap();
        if report.partial_files > 0 {
            writeln!(output, "Files partial:   {}", report.partial_files).unwrap();
        }
        if report.failed_files > 0 {
            writeln!(output, "Files failed:    {}", report.failed_files).unwrap();
        }
        writeln!(output, "Chunks produced: {}", report.total_chunks).unwrap();
        writeln!(output, "Chunks embedded: {}", report.total_chunks_embedded).unwrap();
        writeln!(output, "Rows persisted:  {}", report.rows_persisted).unwrap();
        writeln!(output, "Duration:        {}ms", report.duration_ms).unwrap();

        if !report.failures.is_empty() {
            writeln!(output).unwrap();
            writeln!(output, "Failures:").unwrap();
            for failure in &report.failures {
                let location = match failure.chunk_index {
                    Some(index) => format!("{} (chunk {})", failure.file_name, index),
                    None => failure.file_name.clone(),
                };
                let retry = if failure.retryable { " [retryable]" } else { "" };
                writeln!(
                    output,
                    "  {:?} {}: {}{}",
                    failure.stage, location, failure.message, retry
                )
                .unwrap();
            }
        }

        output
    }

    fn format_upload_report(&self, report: &UploadReport) -> String {
        let mut output = String::new();
        writeln!(output, "Upload Complete").unwrap();
        writeln!(output, "---------------").unwrap();
        writeln!(output, "CSV files read: {}", report.files_read).unwrap();
        writeln!(output, "Rows found:     {}", report.total_rows).unwrap();
        writeln!(output, "Rows inserted:  {}", report.inserted_rows).unwrap();
        if report.inserted_rows < report.total_rows {
            writeln!(
                output,
                "Rows skipped:   {}",
                report.total_rows - report.inserted_rows
            )
            .unwrap();
        }
        output
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        let mut output = String::new();
        writeln!(output, "Status").unwrap();
        writeln!(output, "------").unwrap();

        let embedding_state = if status.embedding_reachable {
            "[REACHABLE]"
        } else {
            "[UNREACHABLE]"
        };
        writeln!(output, "Embedding:  {}", embedding_state).unwrap();
        writeln!(output, "  URL:      {}", status.embedding_url).unwrap();
        writeln!(output, "  Model:    {}", status.embedding_model).unwrap();
        writeln!(output).unwrap();

        let sink_state = if status.sink_reachable {
            "[REACHABLE]"
        } else {
            "[UNREACHABLE]"
        };
        writeln!(output, "Sink:       {}", sink_state).unwrap();
        writeln!(output, "  Target:   {}", status.sink_description).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "Input:      {}", status.input_dir).unwrap();
        writeln!(output, "  PDFs:     {}", status.input_files).unwrap();

        output
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }
}

pub struct JsonFormatter;

impl JsonFormatter {
    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {}\"}}", e))
    }
}

impl Formatter for JsonFormatter {
    fn format_run_report(&self, report: &RunReport) -> String {
        Self::to_json(report)
    }

    fn format_upload_report(&self, report: &UploadReport) -> String {
        Self::to_json(report)
    }

    fn format_status(&self, status: &StatusInfo) -> String {
        Self::to_json(status)
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&serde_json::json!({ "message": message }))
    }

    fn format_error(&self, error: &str) -> String {
        Self::to_json(&serde_json::json!({ "error": error }))
    }
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Success => "success",
        RunStatus::Partial => "partial",
        RunStatus::Failed => "failed",
        RunStatus::Cancelled => "cancelled",
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
