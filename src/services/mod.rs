mod chunker;
mod embedding;
mod extractor;
mod normalizer;
mod pipeline;
mod rate_limit;
mod sink;

pub use chunker::TextChunker;
pub use embedding::{Embedder, EmbeddingClient};
pub use extractor::{PdfExtractor, TextExtractor};
pub use normalizer::TextNormalizer;
pub use pipeline::{BatchPipeline, DocumentOutcome};
pub use rate_limit::RateLimiter;
pub use sink::{CsvSink, PostgresSink, Sink, create_sink};
