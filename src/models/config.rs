use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_EMBEDDING_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "embedding-001";
pub const DEFAULT_TABLE: &str = "documents";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub chunking: ChunkingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub sink: SinkConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pdfembed").join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            return Ok(config);
        }
        Ok(Self::default())
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path().ok_or_else(|| {
            ConfigError::PathError("could not determine config directory".to_string())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Reject configurations the pipeline cannot run with. Called before any
    /// document is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunking.chunk_size <= self.chunking.overlap_size {
            return Err(ConfigError::ValidationError(format!(
                "chunk_size ({}) must be greater than overlap_size ({})",
                self.chunking.chunk_size, self.chunking.overlap_size
            )));
        }
        if self.sink.driver == SinkDriver::Postgres && self.sink.database_url.is_none() {
            return Err(ConfigError::ValidationError(
                "sink driver is postgres but [sink].database_url is not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory scanned for *.pdf files.
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("./pdfs")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive windows.
    #[serde(default = "default_overlap_size")]
    pub overlap_size: usize,

    /// Sentences shorter than this are dropped during normalization.
    #[serde(default = "default_min_sentence_length")]
    pub min_sentence_length: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_overlap_size() -> usize {
    150
}

fn default_min_sentence_length() -> usize {
    10
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap_size: default_overlap_size(),
            min_sentence_length: default_min_sentence_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Vector dimensionality the service produces; used for the pgvector
    /// column type.
    #[serde(default = "default_dimension")]
    pub dimension: u32,

    /// Usually left unset in the file and provided via the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_dimension() -> u32 {
    768
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            timeout_secs: default_timeout(),
            dimension: default_dimension(),
            api_key: None,
        }
    }
}

impl EmbeddingConfig {
    /// API key from the config file, falling back to the environment.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(ref key) = self.api_key
            && !key.is_empty()
        {
            return Ok(key.clone());
        }
        std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingApiKey(API_KEY_ENV.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests_per_window: u32,

    #[serde(default = "default_window_duration")]
    pub window_duration_ms: u64,

    /// Pacing between individual calls while under the window budget.
    #[serde(default = "default_inter_request_delay")]
    pub inter_request_delay_ms: u64,
}

fn default_max_requests() -> u32 {
    60
}

fn default_window_duration() -> u64 {
    60_000
}

fn default_inter_request_delay() -> u64 {
    1_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: default_max_requests(),
            window_duration_ms: default_window_duration(),
            inter_request_delay_ms: default_inter_request_delay(),
        }
    }
}

/// Persistence backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkDriver {
    /// Append records to a local CSV file.
    #[default]
    Csv,
    /// Insert records into a pgvector-backed Postgres table.
    Postgres,
}

impl std::str::FromStr for SinkDriver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(SinkDriver::Csv),
            "postgres" | "postgresql" | "pg" => Ok(SinkDriver::Postgres),
            _ => Err(format!("unknown sink driver: {}", s)),
        }
    }
}

impl std::fmt::Display for SinkDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkDriver::Csv => write!(f, "csv"),
            SinkDriver::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub driver: SinkDriver,

    /// Output file for the CSV driver.
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Connection string for the Postgres driver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_pool_max")]
    pub pool_max: u32,

    #[serde(default = "default_pool_acquire_timeout")]
    pub pool_acquire_timeout_secs: u64,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("./output/embeddings.csv")
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_pool_max() -> u32 {
    5
}

fn default_pool_acquire_timeout() -> u64 {
    10
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            driver: SinkDriver::default(),
            csv_path: default_csv_path(),
            database_url: None,
            table: default_table(),
            pool_max: default_pool_max(),
            pool_acquire_timeout_secs: default_pool_acquire_timeout(),
        }
    }
}
