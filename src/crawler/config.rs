//! # Crawler Configuration Module
//!
//! Configuration for the crawl stage: where the site lives, which listing page
//! is the root of the hierarchy, and the selectors and URL patterns used to
//! read its markup. It uses a builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration

use url::Url;

use crate::crawler::error::CrawlError;

/// Default site root
pub const DEFAULT_BASE_URL: &str = "https://nalibali.org";

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Base URL of the site
    pub base_url: String,

    /// Path of the root listing page holding the hierarchies
    pub root_path: String,

    /// Title recorded on the web resource tree
    pub channel_title: String,

    /// Language recorded on the web resource tree
    pub channel_language: String,

    /// Selector for one hierarchy entry on the root page
    pub hierarchy_item_selector: String,

    /// Selector for the hierarchy link (title and listing URL) inside an entry
    pub hierarchy_link_selector: String,

    /// Selector for the hierarchy description inside an entry
    pub hierarchy_description_selector: String,

    /// Selector for the pagination control of a listing page
    pub pager_selector: String,

    /// Pattern every pagination link must match; group 1 is the page index
    pub page_link_pattern: String,

    /// Selector for one story on a listing page
    pub story_item_selector: String,

    /// Attribute carrying a story's structured title
    pub story_title_attribute: String,

    /// Heading used when no structured title is present
    pub story_heading_selector: String,

    /// Selector for the story author
    pub story_author_selector: String,

    /// Leading label stripped from author fields
    pub story_author_label_pattern: String,

    /// Selector for the story posting date
    pub story_date_selector: String,

    /// Selector for the story thumbnail image
    pub story_thumbnail_selector: String,

    /// Selector for a story's per-language links
    pub story_language_link_selector: String,

    /// Main content region of the audio category page
    pub audio_main_selector: String,

    /// Path pattern of the per-language audio pages
    pub audio_path_pattern: String,

    /// Class marking links on the audio page that are not language pages
    pub audio_excluded_class: String,

    /// Host pattern of the embedded audio platform
    pub audio_host_pattern: String,

    /// Path pattern of the audio platform's RSS feed link
    pub feed_path_pattern: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            root_path: "/story-resources".to_string(),
            channel_title: "Nal'ibali".to_string(),
            channel_language: "en".to_string(),
            hierarchy_item_selector: ".resource-category".to_string(),
            hierarchy_link_selector: "h2 a".to_string(),
            hierarchy_description_selector: ".description".to_string(),
            pager_selector: "ul.pager".to_string(),
            page_link_pattern: r"[?&]page=(\d+)".to_string(),
            story_item_selector: ".story-item".to_string(),
            story_title_attribute: "data-title".to_string(),
            story_heading_selector: "h3".to_string(),
            story_author_selector: ".story-author".to_string(),
            story_author_label_pattern: r"(?i)^\s*author:\s*".to_string(),
            story_date_selector: ".story-date".to_string(),
            story_thumbnail_selector: "img".to_string(),
            story_language_link_selector: ".story-languages a".to_string(),
            audio_main_selector: "#main-content".to_string(),
            audio_path_pattern: r"/audio-stories/".to_string(),
            audio_excluded_class: "button".to_string(),
            audio_host_pattern: r"(^|\.)(soundcloud|podbean)\.com$".to_string(),
            feed_path_pattern: r"(?i)(/feed/?|/rss/?|\.rss|\.xml)$".to_string(),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the base URL of the site
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the path of the root listing page
    pub fn root_path(mut self, root_path: impl Into<String>) -> Self {
        self.config.root_path = root_path.into();
        self
    }

    /// Set the channel title recorded on the tree
    pub fn channel_title(mut self, channel_title: impl Into<String>) -> Self {
        self.config.channel_title = channel_title.into();
        self
    }

    /// Set the host pattern of the embedded audio platform
    pub fn audio_host_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.audio_host_pattern = pattern.into();
        self
    }

    /// Set the path pattern of the RSS feed link
    pub fn feed_path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.feed_path_pattern = pattern.into();
        self
    }

    /// Set the pattern pagination links must match
    pub fn page_link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.page_link_pattern = pattern.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// URL of the root listing page
    pub fn root_url(&self) -> Result<Url, CrawlError> {
        Ok(Url::parse(&self.base_url)?.join(&self.root_path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_url() {
        let config = CrawlerConfig::builder()
            .base_url("http://127.0.0.1:1234")
            .root_path("/resources")
            .build();

        assert_eq!(
            config.root_url().unwrap().as_str(),
            "http://127.0.0.1:1234/resources"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = CrawlerConfig::builder().base_url("not a url").build();
        assert!(matches!(config.root_url(), Err(CrawlError::UrlParse(_))));
    }
}
