use anyhow::Result;
use clap::Parser;

use pdfembed::cli::commands::{handle_config, handle_run, handle_status, handle_upload};
use pdfembed::{Cli, Commands, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let format = cli.format.unwrap_or(OutputFormat::Text);
    let verbose = cli.verbose;

    match cli.command {
        Commands::Run(args) => {
            handle_run(args, format, verbose).await?;
        }
        Commands::Upload(args) => {
            handle_upload(args, format, verbose).await?;
        }
        Commands::Status => {
            handle_status(format, verbose).await?;
        }
        Commands::Config(cmd) => {
            handle_config(cmd, format, verbose).await?;
        }
    }

    Ok(())
}
