//! Status command implementation.

use anyhow::Result;

use crate::cli::output::{OutputFormat, StatusInfo, get_formatter};
use crate::models::{Config, SinkDriver};
use crate::services::{EmbeddingClient, create_sink};
use crate::utils::file::collect_pdf_files;

pub async fn handle_status(format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let formatter = get_formatter(format);

    let embedding_reachable = match config.embedding.resolve_api_key() {
        Ok(api_key) => match EmbeddingClient::new(&config.embedding, api_key) {
            Ok(client) => client.health_check().await.is_ok(),
            Err(_) => false,
        },
        Err(_) => false,
    };

    let (sink_reachable, sink_description) =
        match create_sink(&config.sink, config.embedding.dimension).await {
            Ok(sink) => (
                sink.health_check().await.unwrap_or(false),
                sink.describe(),
            ),
            Err(_) => (false, config.sink.driver.to_string()),
        };

    let input_files = collect_pdf_files(&config.input.dir)
        .map(|files| files.len() as u64)
        .unwrap_or(0);

    let status = StatusInfo {
        embedding_url: config.embedding.url.clone(),
        embedding_model: config.embedding.model.clone(),
        embedding_reachable,
        sink_description,
        sink_reachable,
        input_dir: config.input.dir.display().to_string(),
        input_files,
    };

    print!("{}", formatter.format_status(&status));

    if !embedding_reachable || !sink_reachable {
        eprintln!();
        if !embedding_reachable {
            eprintln!(
                "Hint: embedding service not reachable. Check {} and the API key.",
                config.embedding.url
            );
        }
        if !sink_reachable {
            match config.sink.driver {
                SinkDriver::Csv => {
                    eprintln!(
                        "Warning: CSV output path {} is not writable.",
                        config.sink.csv_path.display()
                    );
                }
                SinkDriver::Postgres => {
                    eprintln!("Warning: PostgreSQL not accessible. Check connection settings.");
                }
            }
        }
    }

    Ok(())
}
