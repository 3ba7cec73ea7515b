//! # Nal'ibali - Story Site Chef
//!
//! This crate harvests the Nal'ibali story-resources site and turns it into a
//! tree of typed content nodes ready for publishing. It runs in two stages
//! separated by a JSON snapshot on disk:
//!
//! - **crawl**: discovers the story categories, walks every paginated listing,
//!   fans stories out per language with cross-page deduplication, and resolves
//!   the audio category through embedded players and their RSS feeds
//! - **scrape**: reads the snapshot back and builds HTML bundles, audio nodes
//!   and PDF documents under one topic per category and language
//!
//! ## Example
//!
//! ```rust,no_run
//! use nalibali::chef::{self, ChefConfig};
//! use nalibali::HttpClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ChefConfig::builder().data_dir("chefdata").build();
//!     let client = HttpClient::with_options(config.http.clone())?;
//!
//!     let root = chef::run(&client, &config).await?;
//!     println!("{} hierarchies", root.children().len());
//!     Ok(())
//! }
//! ```

mod error;
pub mod http;
pub mod languages;

pub mod chef;
pub mod crawler;
pub mod storage;
pub mod transform;

pub use error::Error;
pub use http::HttpClient;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
