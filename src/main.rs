//! # Nal'ibali Chef CLI
//!
//! Runs the whole chef in one go: the crawl stage writes the web resource
//! tree under the data directory, then the scrape stage turns it into the
//! content tree and the HTML bundle archives.
//!
//! Logging honours `RUST_LOG` and defaults to `info`.

mod telemetry;

use clap::Parser;
use nalibali::chef::{self, ChefConfig, DEFAULT_DATA_DIR};
use nalibali::crawler::{CrawlerConfig, DEFAULT_BASE_URL};
use nalibali::http::{HttpClient, HttpOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build the Nal'ibali content tree", long_about = None)]
struct Cli {
    /// Site to crawl
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory for trees, scratch files, archives and the log
    #[arg(short, long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Maximum requests per second
    #[arg(short, long, default_value = "4")]
    rate: u32,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::setup_logging(&cli.data_dir)?;

    let mut http = HttpOptions {
        requests_per_second: cli.rate,
        ..HttpOptions::default()
    };
    if let Some(user_agent) = cli.user_agent {
        http.user_agent = user_agent;
    }

    let config = ChefConfig::builder()
        .data_dir(&cli.data_dir)
        .http(http.clone())
        .crawler(CrawlerConfig::builder().base_url(&cli.base_url).build())
        .build();
    let client = HttpClient::with_options(http)?;

    let root = chef::run(&client, &config).await?;

    let hierarchies = root.children();
    info!("Built content tree with {} hierarchies", hierarchies.len());
    for hierarchy in hierarchies {
        let leaves: usize = hierarchy.children().iter().map(|topic| topic.children().len()).sum();
        println!(
            "{}: {} languages, {} items",
            hierarchy.info().title,
            hierarchy.children().len(),
            leaves
        );
    }

    Ok(())
}
