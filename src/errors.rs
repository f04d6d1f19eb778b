//! Error types for podsift.

/// Alias for Results returning [`PodsiftError`].
pub type Result<T> = std::result::Result<T, PodsiftError>;

/// Top-level error type for podsift.
#[derive(Debug, thiserror::Error)]
pub enum PodsiftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Collector-specific errors.
///
/// These never cross into the pipeline: `safe_collect` converts any of them
/// into an empty record batch plus a warning log, so a failing source degrades
/// output size rather than failing the run.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Collector not configured")]
    NotConfigured,
}
