//! # Crawl Stage
//!
//! This module walks the story site and builds the web resource tree, the
//! snapshot handed to the transform stage. It is responsible only for
//! discovering structure; no content is downloaded here.
//!
//! ## Key Components
//!
//! - `discover`: Fetches the root page and crawls every hierarchy on it
//! - `pagination::walk`: Enumerates all pages of a paginated listing
//! - `stories`: Splits listing pages into per-language stories and merges them
//! - `audio`: Follows the audio pages through the embedded player to its RSS feed
//!
//! Ordering is deterministic: pages and stories are visited in the order their
//! links appear, one request at a time, and languages are keyed by name.

pub mod audio;
mod config;
mod error;
pub mod feed;
mod hierarchy;
pub mod pagination;
pub mod stories;

pub use config::{CrawlerConfig, CrawlerConfigBuilder, DEFAULT_BASE_URL};
pub use error::CrawlError;
pub use hierarchy::{discover, parse_hierarchy_entries, HierarchyEntry};

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminant recorded on the snapshot root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeKind {
    #[default]
    WebResourceTree,
}

/// Root of the crawl snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResourceTree {
    pub kind: TreeKind,

    /// Channel title
    pub title: String,

    /// Channel language code
    pub language: String,

    /// Hierarchies in the order they appear on the root page
    pub children: Vec<Hierarchy>,
}

/// Top-level story categories published on the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MultilingualStories,
    AudioStories,
    StoryCards,
    StorySeeds,
    YourStories,
}

impl Category {
    /// Match a hierarchy title from the root page
    pub fn from_title(title: &str) -> Option<Self> {
        match title.trim().to_lowercase().as_str() {
            "multilingual stories" => Some(Self::MultilingualStories),
            "audio stories" => Some(Self::AudioStories),
            "story cards" => Some(Self::StoryCards),
            "story seeds" => Some(Self::StorySeeds),
            "your stories" | "user stories" => Some(Self::YourStories),
            _ => None,
        }
    }
}

/// A story category and everything crawled beneath it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub category: Category,
    pub title: String,

    /// Canonical listing URL
    pub url: String,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub children: HierarchyChildren,
}

/// Per-language content of a hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "languages")]
pub enum HierarchyChildren {
    /// Language name to stories, deduplicated by URL within each language
    Stories(BTreeMap<String, Vec<Story>>),

    /// Language name to audio episodes
    AudioEpisodes(BTreeMap<String, Vec<AudioEpisode>>),
}

impl HierarchyChildren {
    /// Language names present under the hierarchy
    pub fn languages(&self) -> Vec<&str> {
        match self {
            Self::Stories(by_language) => by_language.keys().map(String::as_str).collect(),
            Self::AudioEpisodes(by_language) => by_language.keys().map(String::as_str).collect(),
        }
    }
}

/// One genuine page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationPage {
    /// Zero-based page index
    pub index: u32,
    pub url: String,

    /// Label shown in the pager
    pub label: String,
}

/// A story as listed on the site, split by language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub title: String,
    pub author: Option<String>,
    pub posted_date: Option<String>,

    /// Language name to the variant in that language
    pub languages: BTreeMap<String, LocalizedStory>,
}

impl Story {
    /// Variant of the story in the given language
    pub fn localized(&self, language: &str) -> Option<&LocalizedStory> {
        self.languages.get(language)
    }
}

/// The variant of a story in one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedStory {
    pub language: String,
    pub url: String,
    pub thumbnail: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub posted_date: Option<String>,
}

/// One item of an audio feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioEpisode {
    pub language: String,

    /// Resolved media URL (the mp3 variant)
    pub url: String,

    /// Path of the resolved media URL
    pub source_id: String,
    pub title: String,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub thumbnail: Option<String>,
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| {
        CrawlError::HtmlParse(format!("Failed to parse selector '{}': {}", selector, e))
    })
}

/// Text content of an element with whitespace collapsed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_category_from_title() {
        assert_eq!(
            Category::from_title("Multilingual stories"),
            Some(Category::MultilingualStories)
        );
        assert_eq!(Category::from_title(" AUDIO STORIES "), Some(Category::AudioStories));
        assert_eq!(Category::from_title("Your stories"), Some(Category::YourStories));
        assert_eq!(Category::from_title("Shop"), None);
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<p>  The \n <b>lost</b>   hat </p>");
        let selector = parse_selector("p").unwrap();
        let p = html.select(&selector).next().unwrap();
        assert_eq!(element_text(p), "The lost hat");
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(parse_selector("div[["), Err(CrawlError::HtmlParse(_))));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let tree = WebResourceTree {
            kind: TreeKind::WebResourceTree,
            title: "Nal'ibali".to_string(),
            language: "en".to_string(),
            children: vec![Hierarchy {
                category: Category::StoryCards,
                title: "Story cards".to_string(),
                url: "https://example.com/cards".to_string(),
                thumbnail: None,
                description: None,
                children: HierarchyChildren::Stories(BTreeMap::new()),
            }],
        };

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["kind"], "WebResourceTree");
        assert_eq!(value["children"][0]["category"], "story_cards");
        assert_eq!(value["children"][0]["children"]["kind"], "Stories");
    }
}
