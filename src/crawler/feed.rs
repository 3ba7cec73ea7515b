//! RSS feed model for the audio platform

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::crawler::CrawlError;

/// `<rss>` document root
#[derive(Debug, Clone, Deserialize)]
pub struct Rss {
    pub channel: Channel,
}

// Element names are matched without their namespace prefix, so `<title>` and
// `<itunes:title>` land in the same list. The first non-empty value wins.

/// `<channel>` element
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Channel {
    #[serde(rename = "title", default)]
    pub titles: Vec<String>,

    #[serde(rename = "author", default)]
    pub authors: Vec<String>,

    /// `<image><url>` and `<itunes:image href>`
    #[serde(rename = "image", default)]
    pub images: Vec<FeedImage>,

    #[serde(rename = "item", default)]
    pub items: Vec<Item>,
}

/// `<item>` element
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(rename = "title", default)]
    pub titles: Vec<String>,

    #[serde(rename = "description", default)]
    pub descriptions: Vec<String>,

    #[serde(rename = "pubDate")]
    pub pub_date: Option<String>,

    #[serde(rename = "author", default)]
    pub authors: Vec<String>,

    #[serde(rename = "image", default)]
    pub images: Vec<FeedImage>,

    pub enclosure: Option<Enclosure>,
}

/// Either image form: `<image><url>...</url></image>` or `<itunes:image href="..."/>`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedImage {
    #[serde(rename = "@href")]
    pub href: Option<String>,

    pub url: Option<String>,
}

/// `<enclosure url="..." type="..."/>`
#[derive(Debug, Clone, Deserialize)]
pub struct Enclosure {
    #[serde(rename = "@url")]
    pub url: String,

    #[serde(rename = "@type")]
    pub mime_type: Option<String>,
}

fn first_text(values: &[String]) -> Option<&str> {
    values.iter().map(|value| value.trim()).find(|value| !value.is_empty())
}

fn first_image(images: &[FeedImage]) -> Option<&str> {
    images.iter().find_map(FeedImage::location)
}

impl FeedImage {
    /// Image URL from whichever form the element used
    pub fn location(&self) -> Option<&str> {
        self.href
            .as_deref()
            .or(self.url.as_deref())
            .map(str::trim)
            .filter(|location| !location.is_empty())
    }
}

impl Channel {
    pub fn title(&self) -> Option<&str> {
        first_text(&self.titles)
    }

    pub fn author(&self) -> Option<&str> {
        first_text(&self.authors)
    }

    pub fn image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

impl Item {
    pub fn title(&self) -> Option<&str> {
        first_text(&self.titles)
    }

    pub fn description(&self) -> Option<&str> {
        first_text(&self.descriptions)
    }

    pub fn author(&self) -> Option<&str> {
        first_text(&self.authors)
    }

    pub fn image(&self) -> Option<&str> {
        first_image(&self.images)
    }
}

/// Parse an RSS document
pub fn parse_feed(xml: &str) -> Result<Rss, CrawlError> {
    Ok(from_str(xml)?)
}
