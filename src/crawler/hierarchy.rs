//! Hierarchy discovery from the root listing page

use scraper::Html;
use tracing::{info, instrument, warn};
use url::Url;

use crate::crawler::stories::{crawl_listing, normalize_thumbnail};
use crate::crawler::{
    audio, element_text, parse_selector, Category, CrawlError, CrawlerConfig, Hierarchy,
    HierarchyChildren, TreeKind, WebResourceTree,
};
use crate::http::HttpClient;

/// A hierarchy entry read from the root page, before its listing is crawled
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyEntry {
    pub category: Category,
    pub title: String,
    pub url: Url,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
}

impl HierarchyEntry {
    fn into_hierarchy(self, children: HierarchyChildren) -> Hierarchy {
        Hierarchy {
            category: self.category,
            title: self.title,
            url: self.url.to_string(),
            thumbnail: self.thumbnail,
            description: self.description,
            children,
        }
    }
}

/// Read the hierarchy entries listed on the root page.
///
/// Entries without a link or with an unknown category are skipped.
pub fn parse_hierarchy_entries(
    html: &str,
    root_url: &Url,
    config: &CrawlerConfig,
) -> Result<Vec<HierarchyEntry>, CrawlError> {
    let document = Html::parse_document(html);
    let item_selector = parse_selector(&config.hierarchy_item_selector)?;
    let link_selector = parse_selector(&config.hierarchy_link_selector)?;
    let description_selector = parse_selector(&config.hierarchy_description_selector)?;
    let image_selector = parse_selector("img[src]")?;

    let mut entries = Vec::new();
    for item in document.select(&item_selector) {
        let Some(link) = item.select(&link_selector).next() else {
            warn!("Skipping hierarchy entry without a link");
            continue;
        };
        let title = element_text(link);
        let Some(category) = Category::from_title(&title) else {
            warn!("Skipping unknown hierarchy {:?}", title);
            continue;
        };
        let href = link.value().attr("href").ok_or_else(|| {
            CrawlError::MarkupShape(format!("Hierarchy {:?} has no href", title))
        })?;

        entries.push(HierarchyEntry {
            category,
            title,
            url: root_url.join(href)?,
            thumbnail: item
                .select(&image_selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| normalize_thumbnail(root_url, src)),
            description: item
                .select(&description_selector)
                .next()
                .map(element_text)
                .filter(|description| !description.is_empty()),
        });
    }

    Ok(entries)
}

/// Crawl the whole site into a web resource tree
#[instrument(skip_all, fields(base_url = %config.base_url))]
pub async fn discover(
    client: &HttpClient,
    config: &CrawlerConfig,
) -> Result<WebResourceTree, CrawlError> {
    let root_url = config.root_url()?;
    let html = client.get_text(&root_url).await?;
    let entries = parse_hierarchy_entries(&html, &root_url, config)?;
    info!("Found {} hierarchies on {}", entries.len(), root_url);

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let content = match entry.category {
            Category::AudioStories => HierarchyChildren::AudioEpisodes(
                audio::crawl_audio_category(client, &entry.url, config).await?,
            ),
            _ => HierarchyChildren::Stories(crawl_listing(client, &entry.url, config).await?),
        };
        info!(
            "Crawled {:?} with languages {:?}",
            entry.title,
            content.languages()
        );
        children.push(entry.into_hierarchy(content));
    }

    Ok(WebResourceTree {
        kind: TreeKind::WebResourceTree,
        title: config.channel_title.clone(),
        language: config.channel_language.clone(),
        children,
    })
}
