//! Error types for the transform module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for transform operations
#[derive(Debug, Error)]
pub enum TransformError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid CSS selector
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// An element the story pages always carry is missing
    #[error("Unexpected markup: {0}")]
    MarkupShape(String),

    /// A content format the chef cannot package yet
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive packaging error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<TransformError> for CrateError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Http(e) => CrateError::Http(e),
            TransformError::Io(e) => CrateError::Io(e),
            _ => CrateError::Transform(err.to_string()),
        }
    }
}
