//! Audio feed resolution
//!
//! The audio category links to one page per language. Each of those embeds a
//! player from an audio platform; the player page links to the platform's RSS
//! feed, and the feed items carry the media enclosures. Every enclosure is
//! probed for an mp3 variant, which is always preferred.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::Html;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::feed::{parse_feed, Channel, Item};
use crate::crawler::{element_text, parse_selector, AudioEpisode, CrawlError, CrawlerConfig};
use crate::http::HttpClient;
use crate::languages;

/// Minimum label length of a language page link
const MIN_LABEL_CHARS: usize = 3;

/// A per-language audio page linked from the category page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPage {
    pub language: &'static str,
    pub url: Url,
}

/// Find the per-language audio pages in the category page's main region
pub fn find_language_pages(
    html: &str,
    page_url: &Url,
    config: &CrawlerConfig,
) -> Result<Vec<AudioPage>, CrawlError> {
    let document = Html::parse_document(html);
    let main_selector = parse_selector(&config.audio_main_selector)?;
    let link_selector = parse_selector("a[href]")?;
    let path_pattern = Regex::new(&config.audio_path_pattern)?;

    let main = document.select(&main_selector).next().ok_or_else(|| {
        CrawlError::MarkupShape(format!("No {} region on {}", config.audio_main_selector, page_url))
    })?;

    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    for link in main.select(&link_selector) {
        if link
            .value()
            .classes()
            .any(|class| class == config.audio_excluded_class)
        {
            continue;
        }
        let label = element_text(link);
        if label.chars().count() < MIN_LABEL_CHARS {
            continue;
        }
        let mut url = page_url.join(link.value().attr("href").unwrap_or_default())?;
        url.set_fragment(None);
        if !path_pattern.is_match(url.path()) || !seen.insert(url.clone()) {
            continue;
        }

        pages.push(AudioPage {
            language: languages::normalize_label(&label),
            url,
        });
    }

    Ok(pages)
}

/// Find the embedded audio platform link on a language page
pub fn find_player_link(
    html: &str,
    page_url: &Url,
    config: &CrawlerConfig,
) -> Result<Url, CrawlError> {
    let document = Html::parse_document(html);
    let embed_selector = parse_selector("iframe[src], a[href]")?;
    let host_pattern = Regex::new(&config.audio_host_pattern)?;

    for element in document.select(&embed_selector) {
        let target = element
            .value()
            .attr("src")
            .or_else(|| element.value().attr("href"))
            .unwrap_or_default();
        let Ok(url) = page_url.join(target) else {
            continue;
        };
        if url.host_str().is_some_and(|host| host_pattern.is_match(host)) {
            return Ok(url);
        }
    }

    Err(CrawlError::MarkupShape(format!(
        "No audio player link on {}",
        page_url
    )))
}

/// Find the RSS feed link on an audio platform page
pub fn find_feed_link(
    html: &str,
    page_url: &Url,
    config: &CrawlerConfig,
) -> Result<Url, CrawlError> {
    let document = Html::parse_document(html);
    let link_selector = parse_selector("link[href], a[href]")?;
    let path_pattern = Regex::new(&config.feed_path_pattern)?;

    document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .find(|url| path_pattern.is_match(url.path()))
        .ok_or_else(|| CrawlError::MarkupShape(format!("No RSS link on {}", page_url)))
}

/// Canonical media URL of an enclosure: query and fragment removed
pub fn canonical_media_url(enclosure_url: &str) -> Result<Url, CrawlError> {
    let mut url = Url::parse(enclosure_url)?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Sibling of a media URL with an `.mp3` extension
pub fn mp3_variant(media_url: &Url) -> Url {
    let path = media_url.path();
    let stem_end = match (path.rfind('.'), path.rfind('/')) {
        (Some(dot), Some(slash)) if dot > slash => dot,
        (Some(dot), None) => dot,
        _ => path.len(),
    };

    let mut url = media_url.clone();
    url.set_path(&format!("{}.mp3", &path[..stem_end]));
    url
}

/// Resolve one feed item into an episode.
///
/// Returns `Ok(None)` for items without a title or enclosure. A missing mp3
/// variant is an error: the platform is expected to always serve one.
pub async fn resolve_episode(
    client: &HttpClient,
    channel: &Channel,
    item: &Item,
    language: &str,
) -> Result<Option<AudioEpisode>, CrawlError> {
    let (Some(title), Some(enclosure)) = (item.title(), item.enclosure.as_ref()) else {
        warn!("Skipping feed item without title or enclosure: {:?}", item.title());
        return Ok(None);
    };

    let media_url = canonical_media_url(&enclosure.url)?;
    let mp3_url = mp3_variant(&media_url);
    if !client.probe(&mp3_url).await? {
        return Err(CrawlError::MissingAudioFallback(mp3_url.to_string()));
    }

    let published = item
        .pub_date
        .as_deref()
        .and_then(|date| DateTime::parse_from_rfc2822(date.trim()).ok())
        .map(|date| date.with_timezone(&Utc));

    Ok(Some(AudioEpisode {
        language: language.to_string(),
        source_id: mp3_url.path().to_string(),
        url: mp3_url.to_string(),
        title: title.to_string(),
        description: item.description().map(str::to_string),
        published,
        author: item.author().or(channel.author()).map(str::to_string),
        thumbnail: item.image().or(channel.image()).map(str::to_string),
    }))
}

/// Resolve every language page of the audio category into episodes
#[instrument(skip(client, config), fields(url = %category_url))]
pub async fn crawl_audio_category(
    client: &HttpClient,
    category_url: &Url,
    config: &CrawlerConfig,
) -> Result<BTreeMap<String, Vec<AudioEpisode>>, CrawlError> {
    let html = client.get_text(category_url).await?;
    let pages = find_language_pages(&html, category_url, config)?;
    debug!("Found {} audio language pages", pages.len());

    let mut by_language: BTreeMap<String, Vec<AudioEpisode>> = BTreeMap::new();
    for page in pages {
        let html = client.get_text(&page.url).await?;
        let player_url = find_player_link(&html, &page.url, config)?;

        let html = client.get_text(&player_url).await?;
        let feed_url = find_feed_link(&html, &player_url, config)?;

        let xml = client.get_text(&feed_url).await?;
        let channel = parse_feed(&xml)?.channel;

        let episodes = by_language.entry(page.language.to_string()).or_default();
        for item in &channel.items {
            if let Some(episode) = resolve_episode(client, &channel, item, page.language).await? {
                episodes.push(episode);
            }
        }
        info!("Resolved {} {} episodes from {}", episodes.len(), page.language, feed_url);
    }

    Ok(by_language)
}
