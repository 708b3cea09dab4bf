//! Error types for Sporre.

use thiserror::Error;

/// Library-level error type for Sporre operations.
#[derive(Error, Debug)]
pub enum SporreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcripts are disabled for this video")]
    TranscriptsDisabled(String),

    #[error("No transcript found in the required language ({0})")]
    TranscriptNotFound(String),

    #[error("Transcript source error: {0}")]
    Transcript(String),

    #[error("Video metadata not found: {0}")]
    MetadataNotFound(String),

    #[error("Metadata provider error: {0}")]
    Metadata(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Embedding index error: {0}")]
    Index(String),

    #[error("Reranking failed: {0}")]
    Rerank(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SporreError {
    /// Whether the failure is attributable to the request rather than the service.
    ///
    /// Client errors map to 4xx responses at the HTTP boundary; everything
    /// else is a server error carrying the underlying message.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SporreError::TranscriptsDisabled(_)
                | SporreError::TranscriptNotFound(_)
                | SporreError::InvalidInput(_)
        )
    }
}

/// Result type alias for Sporre operations.
pub type Result<T> = std::result::Result<T, SporreError>;
