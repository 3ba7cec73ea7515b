//! Error types for the nalibali crate

use thiserror::Error;

/// Result type for chef operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for chef operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Crawl stage error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Transform stage error
    #[error("Transform error: {0}")]
    Transform(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
