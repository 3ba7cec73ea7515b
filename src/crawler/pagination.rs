//! Pagination walker for listing pages
//!
//! A listing's pager only shows a window of page numbers plus navigation aids
//! ("next", "last »", ...). The walker collects the genuine page links, then
//! keeps re-fetching the highest page it knows about until the pager's own
//! "last" link points at a page it has already seen.

use regex::Regex;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::crawler::{element_text, parse_selector, CrawlError, CrawlerConfig, PaginationPage};
use crate::http::HttpClient;

/// Labels of pager links that are navigation aids rather than pages
const NAVIGATION_LABELS: &[&str] = &["next", "previous", "first", "last", "»"];

/// Links read from one page's pagination control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pager {
    /// Genuine page links, in document order
    pub pages: Vec<PaginationPage>,

    /// Page index of the pager's "last" link, if it has one
    pub declared_last: Option<u32>,
}

/// Whether a pager label is a navigation aid
pub fn is_navigation_label(label: &str) -> bool {
    let label = label.trim().to_lowercase();
    label.is_empty() || NAVIGATION_LABELS.iter().any(|aid| label.contains(aid))
}

fn is_last_label(label: &str) -> bool {
    let label = label.trim().to_lowercase();
    label.contains("last") || label == "»"
}

/// Read the pagination control of a listing page.
///
/// Returns `None` when the page has no pager. Every link inside the pager must
/// match the page link pattern; anything else means the markup changed.
pub fn parse_pager(
    html: &str,
    page_url: &Url,
    config: &CrawlerConfig,
) -> Result<Option<Pager>, CrawlError> {
    let document = Html::parse_document(html);
    let pager_selector = parse_selector(&config.pager_selector)?;
    let link_selector = parse_selector("a[href]")?;
    let page_pattern = Regex::new(&config.page_link_pattern)?;

    let Some(pager_element) = document.select(&pager_selector).next() else {
        return Ok(None);
    };

    let mut pager = Pager::default();
    for link in pager_element.select(&link_selector) {
        let href = link.value().attr("href").unwrap_or_default();
        let url = page_url.join(href)?;
        let index = page_pattern
            .captures(url.as_str())
            .and_then(|captures| captures.get(1))
            .and_then(|index| index.as_str().parse::<u32>().ok())
            .ok_or_else(|| {
                CrawlError::MarkupShape(format!(
                    "Pagination link {} does not match {}",
                    url, config.page_link_pattern
                ))
            })?;
        let label = element_text(link);

        if is_last_label(&label) {
            pager.declared_last = Some(index);
        }
        if is_navigation_label(&label) {
            continue;
        }
        pager.pages.push(PaginationPage {
            index,
            url: url.to_string(),
            label,
        });
    }

    Ok(Some(pager))
}

/// Enumerate every page of a listing.
///
/// The result is ordered by page index and starts with a synthetic entry for
/// the listing itself. An empty result means the listing has no pager and is
/// its own only page.
#[instrument(skip(client, config), fields(url = %listing_url))]
pub async fn walk(
    client: &HttpClient,
    listing_url: &Url,
    config: &CrawlerConfig,
) -> Result<Vec<PaginationPage>, CrawlError> {
    let html = client.get_text(listing_url).await?;
    let Some(mut pager) = parse_pager(&html, listing_url, config)? else {
        debug!("No pager on {}", listing_url);
        return Ok(Vec::new());
    };

    let mut pages = BTreeMap::new();
    pages.insert(
        0,
        PaginationPage {
            index: 0,
            url: listing_url.to_string(),
            label: "1".to_string(),
        },
    );

    let mut followed = None;
    loop {
        for page in pager.pages.drain(..) {
            pages.entry(page.index).or_insert(page);
        }

        let Some((&max_index, max_page)) = pages.last_key_value() else {
            break;
        };
        let declared_last = match pager.declared_last {
            Some(last) if last > max_index => last,
            _ => break,
        };
        if followed == Some(max_index) {
            warn!(
                "Pager stopped growing at page {} before its last page {}",
                max_index, declared_last
            );
            break;
        }
        followed = Some(max_index);

        debug!("Following page {} towards last page {}", max_index, declared_last);
        let next_url = Url::parse(&max_page.url)?;
        let html = client.get_text(&next_url).await?;
        pager = parse_pager(&html, &next_url, config)?.unwrap_or_default();
    }

    Ok(pages.into_values().collect())
}
