//! Two-stage pipeline driver
//!
//! `crawl` discovers the site and writes the web resource tree; `scrape` reads
//! it back, transforms it and writes the content tree. `run` does both, in
//! that order, with one HTTP client for the whole run.

use std::path::PathBuf;
use tracing::{info, instrument};

use crate::crawler::{self, CrawlerConfig};
use crate::error::Result;
use crate::http::HttpOptions;
use crate::storage::{Storage, StorageConfig};
use crate::transform::{self, ContentNode, TransformConfig};
use crate::HttpClient;

/// Default data directory
pub const DEFAULT_DATA_DIR: &str = "chefdata";

/// Configuration for a whole chef run
#[derive(Debug, Clone)]
pub struct ChefConfig {
    /// Directory holding trees, scratch files and archives
    pub data_dir: PathBuf,
    pub http: HttpOptions,
    pub crawler: CrawlerConfig,
    pub transform: TransformConfig,
}

impl Default for ChefConfig {
    fn default() -> Self {
        ChefConfigBuilder::new().build()
    }
}

impl ChefConfig {
    /// Create a new builder
    pub fn builder() -> ChefConfigBuilder {
        ChefConfigBuilder::new()
    }

    /// Storage for the trees under the data directory
    pub fn storage(&self) -> Storage {
        Storage::with_config(StorageConfig {
            base_path: self.data_dir.join("trees"),
        })
    }
}

/// Builder for ChefConfig
#[derive(Debug)]
pub struct ChefConfigBuilder {
    data_dir: PathBuf,
    http: HttpOptions,
    crawler: CrawlerConfig,
    transform: TransformConfig,
}

impl Default for ChefConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChefConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            http: HttpOptions::default(),
            crawler: CrawlerConfig::default(),
            transform: TransformConfig::default(),
        }
    }

    /// Set the data directory
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Set the HTTP options
    pub fn http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Set the crawler configuration
    pub fn crawler(mut self, crawler: CrawlerConfig) -> Self {
        self.crawler = crawler;
        self
    }

    /// Set the transform configuration; its scratch and zip directories are
    /// replaced by ones under the data directory
    pub fn transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ChefConfig {
        let mut transform = self.transform;
        transform.scratch_dir = self.data_dir.join("scratch");
        transform.zip_dir = self.data_dir.join("zipfiles");

        ChefConfig {
            data_dir: self.data_dir,
            http: self.http,
            crawler: self.crawler,
            transform,
        }
    }
}

/// Stage 1: crawl the site and write the web resource tree
#[instrument(skip_all)]
pub async fn crawl(client: &HttpClient, config: &ChefConfig) -> Result<PathBuf> {
    info!("Crawling {}", config.crawler.base_url);
    let tree = crawler::discover(client, &config.crawler).await?;
    Ok(config.storage().write_web_resource_tree(&tree).await?)
}

/// Stage 2: transform the web resource tree and write the content tree
#[instrument(skip_all)]
pub async fn scrape(client: &HttpClient, config: &ChefConfig) -> Result<ContentNode> {
    let storage = config.storage();
    let tree = storage.read_web_resource_tree().await?;
    info!("Transforming {} hierarchies", tree.children.len());

    let root = transform::transform(client, &tree, &config.transform).await?;
    storage.write_content_tree(&root).await?;
    Ok(root)
}

/// Run both stages
pub async fn run(client: &HttpClient, config: &ChefConfig) -> Result<ContentNode> {
    crawl(client, config).await?;
    scrape(client, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CONTENT_TREE, WEB_RESOURCE_TREE};
    use crate::transform::FileRef;
    use mockito::{Server, ServerGuard};

    async fn mock_site(server: &mut ServerGuard) {
        let base = server.url();
        let root = r#"<html><body>
            <div class="resource-category">
              <img src="/files/multi.png"><h2><a href="/multilingual">Multilingual stories</a></h2>
              <p class="description">Stories in many languages</p>
            </div>
            <div class="resource-category">
              <h2><a href="/audio-stories">Audio stories</a></h2>
            </div>
            <div class="resource-category">
              <h2><a href="/story-cards">Story cards</a></h2>
            </div>
          </body></html>"#;
        let multilingual = r#"<html><body>
            <div class="story-item" data-title="The Lost Hat">
              <span class="story-author">Author: Jane</span>
              <div class="story-languages">
                <a href="/stories/hat-en">English</a>
                <a href="/stories/hat-zu">isiZulu</a>
              </div>
            </div></body></html>"#;
        let story_page = r#"<html><body><article>
            <div class="story-languages"><a href="/stories/hat-zu">isiZulu</a></div>
            <p>Once upon a time</p><img src="/files/hat.png">
          </article></body></html>"#;
        let audio = r#"<html><body><div id="main-content">
            <a href="/audio-stories/english">English</a>
          </div></body></html>"#;
        let audio_page = format!(
            r#"<html><body><iframe src="{}/player/english"></iframe></body></html>"#,
            base
        );
        let player = format!(
            r#"<html><head><link rel="alternate" href="{}/feeds/english.rss"></head></html>"#,
            base
        );
        let feed = format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>English</title>
              <item>
                <title>Ep 1</title>
                <enclosure url="{}/media/ep1.wav?dl=1" type="audio/wav"/>
              </item>
            </channel></rss>"#,
            base
        );
        let cards = r#"<html><body>
            <div class="story-item"><h3>Counting card</h3>
              <div class="story-languages"><a href="/files/count-af.pdf">Afrikaans</a></div>
            </div></body></html>"#;

        let pages: Vec<(&str, String)> = vec![
            ("/story-resources", root.to_string()),
            ("/multilingual", multilingual.to_string()),
            ("/stories/hat-en", story_page.to_string()),
            ("/stories/hat-zu", story_page.to_string()),
            ("/audio-stories", audio.to_string()),
            ("/audio-stories/english", audio_page),
            ("/player/english", player),
            ("/feeds/english.rss", feed),
            ("/story-cards", cards.to_string()),
        ];
        for (path, body) in pages {
            server.mock("GET", path).with_body(body).create_async().await;
        }
        server
            .mock("GET", "/files/hat.png")
            .with_body([1u8, 2, 3])
            .create_async()
            .await;
        server
            .mock("HEAD", "/media/ep1.mp3")
            .with_status(200)
            .create_async()
            .await;
    }

    fn test_config(server: &ServerGuard, data_dir: &std::path::Path) -> ChefConfig {
        ChefConfig::builder()
            .data_dir(data_dir)
            .http(HttpOptions {
                requests_per_second: 100,
                ..HttpOptions::default()
            })
            .crawler(
                CrawlerConfig::builder()
                    .base_url(server.url())
                    .audio_host_pattern(r"^127\.0\.0\.1$")
                    .build(),
            )
            .build()
    }

    #[test]
    fn test_builder_derives_paths_from_data_dir() {
        let config = ChefConfig::builder().data_dir("/tmp/chef").build();
        assert_eq!(config.transform.scratch_dir, PathBuf::from("/tmp/chef/scratch"));
        assert_eq!(config.transform.zip_dir, PathBuf::from("/tmp/chef/zipfiles"));
        assert_eq!(
            config.storage().path(WEB_RESOURCE_TREE),
            PathBuf::from("/tmp/chef/trees/web_resource_tree.json")
        );
    }

    #[tokio::test]
    async fn test_crawl_then_scrape() {
        let mut server = Server::new_async().await;
        mock_site(&mut server).await;
        let work = tempfile::tempdir().unwrap();
        let config = test_config(&server, work.path());
        let client = HttpClient::with_options(config.http.clone()).unwrap();

        let snapshot_path = crawl(&client, &config).await.unwrap();
        assert!(snapshot_path.ends_with(WEB_RESOURCE_TREE));

        let tree = config.storage().read_web_resource_tree().await.unwrap();
        let titles: Vec<&str> = tree.children.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Multilingual stories", "Audio stories", "Story cards"]);

        let root = scrape(&client, &config).await.unwrap();
        assert!(work.path().join("trees").join(CONTENT_TREE).exists());

        let hierarchies = root.children();
        assert_eq!(hierarchies.len(), 3);

        let multilingual = &hierarchies[0];
        assert_eq!(
            multilingual.info().description.as_deref(),
            Some("Stories in many languages")
        );
        let languages: Vec<&str> = multilingual
            .children()
            .iter()
            .map(|topic| topic.info().title.as_str())
            .collect();
        assert_eq!(languages, vec!["English", "isiZulu"]);
        let story = &multilingual.children()[0].children()[0];
        assert_eq!(story.source_id(), "/stories/hat-en");
        assert_eq!(story.info().author.as_deref(), Some("Jane"));
        assert!(matches!(story.files()[0], FileRef::Html5Zip { .. }));

        let audio = &hierarchies[1];
        assert_eq!(audio.children().len(), 1);
        let episode = &audio.children()[0].children()[0];
        assert_eq!(episode.source_id(), "/media/ep1.mp3");
        assert_eq!(
            episode.files(),
            &[FileRef::Audio {
                url: format!("{}/media/ep1.mp3", server.url())
            }]
        );

        let cards = &hierarchies[2];
        assert_eq!(cards.children()[0].info().language, "af");

        let again = scrape(&client, &config).await.unwrap();
        assert_eq!(again, root);
    }

    #[tokio::test]
    async fn test_scrape_without_snapshot_fails() {
        let work = tempfile::tempdir().unwrap();
        let config = ChefConfig::builder().data_dir(work.path()).build();
        let client = HttpClient::new().unwrap();

        assert!(scrape(&client, &config).await.is_err());
    }
}
