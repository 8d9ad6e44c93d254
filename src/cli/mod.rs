//! CLI module for the embedding pipeline.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use output::OutputFormat;

/// Batch PDF-to-embedding pipeline.
#[derive(Debug, Parser)]
#[command(name = "pdfembed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(long, short = 'f', global = true, help = "Output format: text or json")]
    pub format: Option<OutputFormat>,

    #[arg(long, short = 'v', global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Embed every PDF in the input directory and persist the records
    Run(commands::RunArgs),

    /// Insert previously produced CSV output into the Postgres table
    Upload(commands::UploadArgs),

    /// Check embedding service and sink reachability
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::ConfigCommand),
}

// FromStr for OutputFormat is implemented in cli::output
