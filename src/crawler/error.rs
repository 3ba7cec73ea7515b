//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid CSS selector
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// An element or attribute the site always carries is missing or malformed
    #[error("Unexpected markup: {0}")]
    MarkupShape(String),

    /// Invalid URL pattern in the configuration
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// RSS feed could not be parsed
    #[error("Feed error: {0}")]
    Feed(#[from] quick_xml::errors::serialize::DeError),

    /// The mp3 variant of a feed enclosure does not exist
    #[error("No mp3 variant at {0}")]
    MissingAudioFallback(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
