use thiserror::Error;

/// Failures surfaced by the search and embedding clients.
///
/// Underlying library errors are wrapped transparently; nothing here is
/// retried or recovered.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] figment::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("credential error: {0}")]
    Credential(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    #[error("embedding count mismatch: expected {expected}, got {got}")]
    EmbeddingCount { expected: usize, got: usize },

    #[error("upload rejected for keys: {}", .failed.join(", "))]
    PartialUpload { failed: Vec<String> },
}

pub type Result<T> = std::result::Result<T, Error>;
