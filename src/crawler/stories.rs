//! Story extraction and cross-page merging
//!
//! Each listing page holds a list of stories. Every story links to one page
//! per language, so extraction splits it into one `LocalizedStory` per
//! language link. Pages of the same listing are then merged per language,
//! keeping the first occurrence of every story URL.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, instrument};
use url::Url;

use crate::crawler::{
    element_text, pagination, parse_selector, CrawlError, CrawlerConfig, LocalizedStory, Story,
};
use crate::http::HttpClient;
use crate::languages;

/// Image extensions accepted for thumbnails
const THUMBNAIL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Strip a leading "author:" label from an author field
pub fn strip_author_label(label: &Regex, author: &str) -> String {
    label.replace(author, "").trim().to_string()
}

/// Resolve a thumbnail URL, keeping it only if it points at a supported image
pub fn normalize_thumbnail(page_url: &Url, src: &str) -> Option<String> {
    let mut url = page_url.join(src).ok()?;
    url.set_query(None);
    url.set_fragment(None);

    let extension = url.path().rsplit_once('.')?.1.to_lowercase();
    THUMBNAIL_EXTENSIONS
        .contains(&extension.as_str())
        .then(|| url.to_string())
}

fn story_title(item: ElementRef<'_>, config: &CrawlerConfig) -> Result<Option<String>, CrawlError> {
    let attribute = config.story_title_attribute.as_str();
    let titled = parse_selector(&format!("[{}]", attribute))?;
    let heading = parse_selector(&config.story_heading_selector)?;

    let structured = item
        .value()
        .attr(attribute)
        .map(str::to_string)
        .or_else(|| {
            item.select(&titled)
                .next()
                .and_then(|element| element.value().attr(attribute))
                .map(str::to_string)
        });
    let title = structured
        .or_else(|| item.select(&heading).next().map(element_text))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty());

    Ok(title)
}

/// Extract every story on one listing page.
///
/// Stories without a title or without any language link are dropped.
pub fn extract_stories(
    html: &str,
    page_url: &Url,
    config: &CrawlerConfig,
) -> Result<Vec<Story>, CrawlError> {
    let document = Html::parse_document(html);
    let item_selector = parse_selector(&config.story_item_selector)?;
    let author_selector = parse_selector(&config.story_author_selector)?;
    let date_selector = parse_selector(&config.story_date_selector)?;
    let thumbnail_selector = parse_selector(&config.story_thumbnail_selector)?;
    let language_selector = parse_selector(&config.story_language_link_selector)?;
    let author_label = Regex::new(&config.story_author_label_pattern)?;

    let mut stories = Vec::new();
    for item in document.select(&item_selector) {
        let Some(title) = story_title(item, config)? else {
            debug!("Dropping story without a title on {}", page_url);
            continue;
        };

        let author = item
            .select(&author_selector)
            .next()
            .map(|element| strip_author_label(&author_label, &element_text(element)))
            .filter(|author| !author.is_empty());
        let posted_date = item
            .select(&date_selector)
            .next()
            .map(element_text)
            .filter(|date| !date.is_empty());
        let thumbnail = item
            .select(&thumbnail_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .and_then(|src| normalize_thumbnail(page_url, src));

        // Unrecognised labels only fill an empty slot and give way to a real match
        let mut localized = BTreeMap::new();
        let mut fallbacks = HashSet::new();
        for link in item.select(&language_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let mut url = page_url.join(href)?;
            url.set_fragment(None);

            let label = element_text(link);
            let (language, recognised) = match languages::resolve_label(&label) {
                Some(language) => (language, true),
                None => (languages::normalize_label(&label), false),
            };
            let story = LocalizedStory {
                language: language.to_string(),
                url: url.to_string(),
                thumbnail: thumbnail.clone(),
                title: title.clone(),
                author: author.clone(),
                posted_date: posted_date.clone(),
            };

            match localized.entry(language.to_string()) {
                Entry::Vacant(slot) => {
                    if !recognised {
                        fallbacks.insert(language);
                    }
                    slot.insert(story);
                }
                Entry::Occupied(mut slot) => {
                    if recognised && fallbacks.remove(language) {
                        debug!("{} link {} replaces a fallback entry", language, url);
                        slot.insert(story);
                    }
                }
            }
        }

        if localized.is_empty() {
            debug!("Dropping story {:?} without language links", title);
            continue;
        }

        stories.push(Story {
            title,
            author,
            posted_date,
            languages: localized,
        });
    }

    Ok(stories)
}

/// Merges the stories of several listing pages into per-language lists.
///
/// A story is admitted to a language's list only if its URL in that language
/// has not been seen yet. Merging page by page gives the same result as
/// merging all pages at once.
#[derive(Debug, Default)]
pub struct StoryMerger {
    by_language: BTreeMap<String, Vec<Story>>,
    seen: HashMap<String, HashSet<String>>,
}

impl StoryMerger {
    /// Create an empty merger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the stories of one page
    pub fn extend<I>(&mut self, stories: I)
    where
        I: IntoIterator<Item = Story>,
    {
        for story in stories {
            for (language, localized) in &story.languages {
                let seen = self.seen.entry(language.clone()).or_default();
                if seen.insert(localized.url.clone()) {
                    self.by_language
                        .entry(language.clone())
                        .or_default()
                        .push(story.clone());
                }
            }
        }
    }

    /// The merged per-language story lists
    pub fn into_languages(self) -> BTreeMap<String, Vec<Story>> {
        self.by_language
    }
}

/// Merge the story lists of several pages
pub fn merge_pages<I>(pages: I) -> BTreeMap<String, Vec<Story>>
where
    I: IntoIterator<Item = Vec<Story>>,
{
    let mut merger = StoryMerger::new();
    for page in pages {
        merger.extend(page);
    }
    merger.into_languages()
}

/// Crawl every page of a story listing into per-language story lists
#[instrument(skip(client, config), fields(url = %listing_url))]
pub async fn crawl_listing(
    client: &HttpClient,
    listing_url: &Url,
    config: &CrawlerConfig,
) -> Result<BTreeMap<String, Vec<Story>>, CrawlError> {
    let pages = pagination::walk(client, listing_url, config).await?;
    let page_urls = if pages.is_empty() {
        vec![listing_url.clone()]
    } else {
        pages
            .iter()
            .map(|page| Url::parse(&page.url))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut merger = StoryMerger::new();
    for page_url in &page_urls {
        let html = client.get_text(page_url).await?;
        let stories = extract_stories(&html, page_url, config)?;
        debug!("Found {} stories on {}", stories.len(), page_url);
        merger.extend(stories);
    }

    let by_language = merger.into_languages();
    info!(
        "Crawled {} pages of {} into {} languages",
        page_urls.len(),
        listing_url,
        by_language.len()
    );
    Ok(by_language)
}
