//! Run command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::output::{OutputFormat, get_formatter};
use crate::error::ConfigError;
use crate::models::{Config, RunStatus, SinkDriver, SourceDocument};
use crate::services::{BatchPipeline, DocumentOutcome, EmbeddingClient, PdfExtractor, create_sink};
use crate::utils::file::collect_pdf_files;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory containing PDF files (overrides [input].dir)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Sink driver: csv or postgres (overrides [sink].driver)
    #[arg(long, short = 's')]
    pub sink: Option<SinkDriver>,

    /// List the files that would be processed without embedding anything
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_run(args: RunArgs, format: OutputFormat, verbose: bool) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(input) = args.input {
        config.input.dir = input;
    }
    if let Some(sink) = args.sink {
        config.sink.driver = sink;
    }
    config.validate()?;

    let formatter = get_formatter(format);

    let files = collect_pdf_files(&config.input.dir)
        .with_context(|| format!("failed to read input directory {}", config.input.dir.display()))?;

    if files.is_empty() {
        return Err(ConfigError::NoInputFiles(config.input.dir.display().to_string()).into());
    }

    if verbose {
        println!("Found {} PDF files to process", files.len());
    }

    if args.dry_run {
        println!(
            "{}",
            formatter.format_message(&format!("Dry run: would process {} files", files.len()))
        );
        for file in &files {
            println!("  {}", file.display());
        }
        return Ok(());
    }

    let documents: Vec<SourceDocument> = files.into_iter().map(SourceDocument::new).collect();

    let api_key = config.embedding.resolve_api_key()?;
    let embedder =
        EmbeddingClient::new(&config.embedding, api_key).context("failed to build embedding client")?;
    let sink = create_sink(&config.sink, config.embedding.dimension)
        .await
        .context("failed to initialize sink")?;

    let pipeline = BatchPipeline::new(
        &config,
        Box::new(PdfExtractor),
        Box::new(embedder),
        sink,
    );

    if verbose {
        let chunking = pipeline.chunking();
        println!(
            "Chunking with chunk_size={} overlap_size={}",
            chunking.chunk_size, chunking.overlap_size
        );
    }

    // Ctrl-c requests cancellation; the pipeline honors it between documents
    // so no partially embedded document is persisted.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancellation requested; finishing current document...");
            cancel_flag.store(true, Ordering::Relaxed);
        }
    });

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap()
            .progress_chars("#>-"),
    );

    let report = pipeline
        .run(documents, &cancel, |document, outcome| {
            pb.inc(1);
            if verbose {
                let label = match outcome {
                    DocumentOutcome::Processed => "ok",
                    DocumentOutcome::Partial => "partial",
                    DocumentOutcome::Failed => "failed",
                };
                pb.println(format!("{}: {}", document.file_name, label));
            }
        })
        .await;

    pb.finish_and_clear();
    print!("{}", formatter.format_run_report(&report));

    if report.status == RunStatus::Failed {
        anyhow::bail!("run failed: no chunks were embedded");
    }

    Ok(())
}
