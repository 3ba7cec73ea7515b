//! HTML bundles for story pages
//!
//! A story page is cut down to its main section, the cross-language widget is
//! removed, and every image in the section is downloaded next to a minimal
//! standalone page. The scratch directory is then zipped into a
//! content-addressed archive.

use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http::HttpClient;
use crate::transform::{archive, TransformConfig, TransformError};

/// An image referenced by a story section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// `src` attribute as written in the page
    pub src: String,

    /// Absolute URL of the image
    pub url: Url,

    /// Path of the image inside the bundle
    pub local_path: String,
}

/// Main section of a story page, ready to bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryFragment {
    pub html: String,
    pub images: Vec<ImageAsset>,
}

fn parse_selector(selector: &str) -> Result<Selector, TransformError> {
    Selector::parse(selector).map_err(|e| {
        TransformError::HtmlParse(format!("Failed to parse selector '{}': {}", selector, e))
    })
}

/// Keep a path usable inside a zip and from a relative `src`
fn sanitize_path(path: &str) -> String {
    path.trim_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Escape a value the way the serializer writes attribute values
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
}

/// Point every `src` attribute equal to `from` at `to`.
///
/// The serializer writes each attribute after a single space, which keeps
/// `data-src` and similar attributes out of the match.
pub fn rewrite_src(html: &str, from: &str, to: &str) -> String {
    html.replace(
        &format!(" src=\"{}\"", escape_attribute(from)),
        &format!(" src=\"{}\"", escape_attribute(to)),
    )
}

/// Bundle path for an image: host and path, with a numeric suffix when two
/// different URLs would land on the same file
fn local_path_for(url: &Url, taken: &mut HashSet<String>) -> Option<String> {
    let path = sanitize_path(url.path());
    if path.is_empty() {
        return None;
    }
    let candidate = match url.host_str() {
        Some(host) => format!("{}/{}", sanitize_path(host), path),
        None => path,
    };

    let (stem, extension) = match candidate.rfind('.') {
        Some(dot) if !candidate[dot..].contains('/') => candidate.split_at(dot),
        _ => (candidate.as_str(), ""),
    };
    let mut local_path = candidate.clone();
    let mut suffix = 1;
    while !taken.insert(local_path.clone()) {
        local_path = format!("{}-{}{}", stem, suffix, extension);
        suffix += 1;
    }
    Some(local_path)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wrap a fragment in a standalone page
pub fn html_shell(title: &str, body: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n"
        ),
        escape_text(title),
        body
    )
}

/// Cut a story page down to its main section.
///
/// The content selector is a comma-separated list tried in order. A page
/// without any matching section means the site layout changed.
pub fn extract_story_fragment(
    html: &str,
    page_url: &Url,
    config: &TransformConfig,
) -> Result<StoryFragment, TransformError> {
    let document = Html::parse_document(html);

    let mut section = None;
    for candidate in config.content_selector.split(',') {
        let selector = parse_selector(candidate.trim())?;
        if let Some(element) = document.select(&selector).next() {
            section = Some(element.html());
            break;
        }
    }
    let section = section.ok_or_else(|| {
        TransformError::MarkupShape(format!(
            "No {} section on {}",
            config.content_selector, page_url
        ))
    })?;

    let mut fragment = Html::parse_fragment(&section);
    let widget_selector = parse_selector(&config.language_widget_selector)?;
    let widgets: Vec<_> = fragment.select(&widget_selector).map(|widget| widget.id()).collect();
    for id in widgets {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }

    // Detached nodes stay in the arena, so walk from the root to skip them
    let image_selector = parse_selector("img[src]")?;
    let mut seen = HashSet::new();
    let mut taken = HashSet::new();
    let mut by_url: HashMap<Url, String> = HashMap::new();
    let mut images = Vec::new();
    for img in fragment.root_element().select(&image_selector) {
        let src = img.value().attr("src").unwrap_or_default();
        if !seen.insert(src.to_string()) {
            continue;
        }
        let Ok(url) = page_url.join(src) else {
            warn!("Ignoring image with invalid src {:?}", src);
            continue;
        };
        let local_path = match by_url.get(&url) {
            Some(local_path) => local_path.clone(),
            None => {
                let Some(local_path) = local_path_for(&url, &mut taken) else {
                    continue;
                };
                by_url.insert(url.clone(), local_path.clone());
                local_path
            }
        };
        images.push(ImageAsset {
            src: src.to_string(),
            url,
            local_path,
        });
    }

    Ok(StoryFragment {
        html: fragment.root_element().inner_html(),
        images,
    })
}

/// Fetch a story page and package it as a zip bundle.
///
/// Images that cannot be downloaded are left pointing at their original URL.
#[instrument(skip(client, title, config), fields(url = %story_url))]
pub async fn bundle_story(
    client: &HttpClient,
    story_url: &Url,
    title: &str,
    config: &TransformConfig,
) -> Result<PathBuf, TransformError> {
    let html = client.get_text(story_url).await?;
    let fragment = extract_story_fragment(&html, story_url, config)?;

    let mut scratch_name = sanitize_path(story_url.path()).replace('/', "_");
    if scratch_name.is_empty() {
        scratch_name.push_str("index");
    }
    let scratch = config.scratch_dir.join(scratch_name);
    if fs::try_exists(&scratch).await? {
        fs::remove_dir_all(&scratch).await?;
    }
    fs::create_dir_all(&scratch).await?;

    let mut body = fragment.html;
    for image in &fragment.images {
        let bytes = match client.get_bytes(&image.url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping image {}: {}", image.url, e);
                continue;
            }
        };
        let destination = scratch.join(&image.local_path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&destination, bytes).await?;
        body = rewrite_src(&body, &image.src, &image.local_path);
    }

    fs::write(scratch.join("index.html"), html_shell(title, &body)).await?;
    let zip_path = archive::create_predictable_zip(&scratch, &config.zip_dir)?;
    fs::remove_dir_all(&scratch).await?;

    debug!("Bundled {} into {}", story_url, zip_path.display());
    Ok(zip_path)
}
