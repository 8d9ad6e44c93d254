//! Upload command implementation.
//!
//! Reads CSV files produced by earlier runs and inserts their rows into the
//! configured Postgres table. Rows whose metadata column is not valid JSON
//! are inserted with null metadata rather than dropped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::{OutputFormat, UploadReport, get_formatter};
use crate::models::{Config, EmbeddedRecord};
use crate::services::{PostgresSink, Sink};

#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Directory scanned for *.csv files (defaults to the CSV sink's directory)
    #[arg(long, short = 'd')]
    pub dir: Option<PathBuf>,
}

pub async fn handle_upload(args: UploadArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let dir = args.dir.unwrap_or_else(|| {
        config
            .sink
            .csv_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let csv_files = collect_csv_files(&dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    if csv_files.is_empty() {
        anyhow::bail!("no CSV files found in {}", dir.display());
    }

    let sink = PostgresSink::new(&config.sink, config.embedding.dimension)
        .await
        .context("failed to connect to Postgres")?;

    let mut report = UploadReport::default();

    for file in &csv_files {
        if verbose {
            println!("Uploading {}", file.display());
        }

        let records = read_records(file)
            .with_context(|| format!("failed to parse {}", file.display()))?;
        report.files_read += 1;
        report.total_rows += records.len() as u64;

        let inserted = sink
            .persist(&records)
            .await
            .with_context(|| format!("failed to upload rows from {}", file.display()))?;
        report.inserted_rows += inserted;
    }

    print!("{}", formatter.format_upload_report(&report));
    Ok(())
}

fn collect_csv_files(dir: &std::path::Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|e| e.to_string_lossy().eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Parse one CSV file back into records. The embedding column must be a JSON
/// float array; a row without one is malformed and skipped with a warning.
fn read_records(path: &std::path::Path) -> Result<Vec<EmbeddedRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let metadata_field = row.get(0).unwrap_or_default();
        let content = row.get(1).unwrap_or_default().to_string();
        let embedding_field = row.get(2).unwrap_or_default();

        let embedding: Vec<f32> = match serde_json::from_str(embedding_field) {
            Ok(values) => values,
            Err(e) => {
                eprintln!(
                    "warning: skipping row with malformed embedding in {}: {}",
                    path.display(),
                    e
                );
                continue;
            }
        };

        let metadata = match serde_json::from_str(metadata_field) {
            Ok(value) => value,
            Err(_) => {
                eprintln!(
                    "warning: metadata is not valid JSON in {}, inserting null",
                    path.display()
                );
                serde_json::Value::Null
            }
        };

        records.push(EmbeddedRecord {
            content,
            embedding,
            metadata,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_records_parses_valid_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "metadata,content,embedding").unwrap();
        writeln!(
            file,
            "\"{{\"\"file_name\"\":\"\"a.pdf\"\"}}\",some text,\"[0.5,-1.0]\""
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "some text");
        assert_eq!(records[0].embedding, vec![0.5, -1.0]);
        assert_eq!(records[0].metadata["file_name"], "a.pdf");
    }

    #[test]
    fn test_read_records_nulls_bad_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "metadata,content,embedding").unwrap();
        writeln!(file, "not json,text,\"[1.0]\"").unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].metadata.is_null());
    }

    #[test]
    fn test_read_records_skips_bad_embedding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "metadata,content,embedding").unwrap();
        writeln!(file, "null,text,not-an-array").unwrap();
        writeln!(file, "null,other,\"[2.0]\"").unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "other");
    }

    #[test]
    fn test_collect_csv_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "x").unwrap();
        std::fs::write(dir.path().join("a.csv"), "x").unwrap();
        std::fs::write(dir.path().join("c.txt"), "x").unwrap();

        let files = collect_csv_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }
}
