//! Error types for Spol.

use thiserror::Error;

/// Library-level error type for Spol operations.
#[derive(Error, Debug)]
pub enum SpolError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Relevance scoring failed: {0}")]
    Scoring(String),

    #[error("Index error: {0}")]
    Index(String),

    /// Search was issued before any index was built or loaded in this process.
    #[error("No index is active. Build or load an index before searching.")]
    IndexUninitialized,

    /// No persisted index exists for the requested video.
    #[error("Video '{0}' has not been indexed. Process it first.")]
    VideoNotIndexed(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Spol operations.
pub type Result<T> = std::result::Result<T, SpolError>;
