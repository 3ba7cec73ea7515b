//! # Transform Stage
//!
//! This module turns the crawl snapshot into the content node tree. It never
//! mutates the snapshot; every node is built fresh.
//!
//! The output has one topic per hierarchy, one topic per language beneath it,
//! and one content node per story or episode:
//!
//! - multilingual stories, story seeds and your stories become HTML bundles
//! - story cards become documents (PDF only)
//! - audio episodes become audio nodes pointing at the remote mp3

pub mod archive;
mod config;
mod error;
pub mod html_bundle;
mod node;

pub use config::{TransformConfig, TransformConfigBuilder};
pub use error::TransformError;
pub use node::{ContentNode, FileRef, LeafNode, License, NodeInfo, TopicNode};

use tracing::{info, instrument, warn};
use url::Url;

use crate::crawler::{
    AudioEpisode, Category, Hierarchy, HierarchyChildren, LocalizedStory, WebResourceTree,
};
use crate::http::HttpClient;
use crate::languages;

/// Build the content node tree for a crawl snapshot
#[instrument(skip_all, fields(title = %tree.title))]
pub async fn transform(
    client: &HttpClient,
    tree: &WebResourceTree,
    config: &TransformConfig,
) -> Result<ContentNode, TransformError> {
    let mut children = Vec::with_capacity(tree.children.len());
    for hierarchy in &tree.children {
        children.push(transform_hierarchy(client, hierarchy, &tree.language, config).await?);
    }

    Ok(ContentNode::Topic(TopicNode {
        info: NodeInfo {
            source_id: tree.title.clone(),
            title: tree.title.clone(),
            description: None,
            author: None,
            language: tree.language.clone(),
            license: config.license.clone(),
            thumbnail: None,
        },
        children,
    }))
}

#[instrument(skip_all, fields(hierarchy = %hierarchy.title))]
async fn transform_hierarchy(
    client: &HttpClient,
    hierarchy: &Hierarchy,
    channel_language: &str,
    config: &TransformConfig,
) -> Result<ContentNode, TransformError> {
    let mut topics = Vec::new();
    match &hierarchy.children {
        HierarchyChildren::Stories(by_language) => {
            for (language, stories) in by_language {
                let mut nodes = Vec::with_capacity(stories.len());
                for story in stories {
                    let Some(localized) = story.localized(language) else {
                        warn!("Story {:?} has no {} variant", story.title, language);
                        continue;
                    };
                    nodes.push(story_node(client, hierarchy.category, localized, config).await?);
                }
                topics.push(language_topic(hierarchy, language, nodes, config));
            }
        }
        HierarchyChildren::AudioEpisodes(by_language) => {
            for (language, episodes) in by_language {
                let nodes = episodes
                    .iter()
                    .map(|episode| audio_node(episode, config))
                    .collect();
                topics.push(language_topic(hierarchy, language, nodes, config));
            }
        }
    }
    info!("Transformed {:?} into {} language topics", hierarchy.title, topics.len());

    Ok(ContentNode::Topic(TopicNode {
        info: NodeInfo {
            source_id: hierarchy.url.clone(),
            title: hierarchy.title.clone(),
            description: hierarchy.description.clone(),
            author: None,
            language: channel_language.to_string(),
            license: config.license.clone(),
            thumbnail: hierarchy.thumbnail.clone(),
        },
        children: topics,
    }))
}

fn language_topic(
    hierarchy: &Hierarchy,
    language: &str,
    children: Vec<ContentNode>,
    config: &TransformConfig,
) -> ContentNode {
    ContentNode::Topic(TopicNode {
        info: NodeInfo {
            source_id: format!("{}:{}", hierarchy.url, language),
            title: language.to_string(),
            description: None,
            author: None,
            language: languages::code_for(language).to_string(),
            license: config.license.clone(),
            thumbnail: None,
        },
        children,
    })
}

fn story_info(localized: &LocalizedStory, source_id: &str, config: &TransformConfig) -> NodeInfo {
    NodeInfo {
        source_id: source_id.to_string(),
        title: localized.title.clone(),
        description: None,
        author: localized.author.clone(),
        language: languages::code_for(&localized.language).to_string(),
        license: config.license.clone(),
        thumbnail: localized.thumbnail.clone(),
    }
}

async fn story_node(
    client: &HttpClient,
    category: Category,
    localized: &LocalizedStory,
    config: &TransformConfig,
) -> Result<ContentNode, TransformError> {
    let url = Url::parse(&localized.url)?;
    match category {
        Category::StoryCards => document_node(localized, &url, config),
        _ => {
            let path = html_bundle::bundle_story(client, &url, &localized.title, config).await?;
            Ok(ContentNode::Html5(LeafNode {
                info: story_info(localized, url.path(), config),
                files: vec![FileRef::Html5Zip { path }],
            }))
        }
    }
}

/// Document node for a story card; only PDFs are supported
pub fn document_node(
    localized: &LocalizedStory,
    url: &Url,
    config: &TransformConfig,
) -> Result<ContentNode, TransformError> {
    if !url.path().to_lowercase().ends_with(".pdf") {
        return Err(TransformError::UnsupportedFormat(format!(
            "story card {} is not a PDF",
            url
        )));
    }

    Ok(ContentNode::Document(LeafNode {
        info: story_info(localized, url.path(), config),
        files: vec![FileRef::Document {
            url: url.to_string(),
        }],
    }))
}

/// Audio node referencing the resolved remote media URL
pub fn audio_node(episode: &AudioEpisode, config: &TransformConfig) -> ContentNode {
    ContentNode::Audio(LeafNode {
        info: NodeInfo {
            source_id: episode.source_id.clone(),
            title: episode.title.clone(),
            description: episode.description.clone(),
            author: episode.author.clone(),
            language: languages::code_for(&episode.language).to_string(),
            license: config.license.clone(),
            thumbnail: episode.thumbnail.clone(),
        },
        files: vec![FileRef::Audio {
            url: episode.url.clone(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{Story, TreeKind};
    use std::collections::BTreeMap;

    fn localized(language: &str, url: &str) -> LocalizedStory {
        LocalizedStory {
            language: language.to_string(),
            url: url.to_string(),
            thumbnail: Some("https://example.com/t.png".to_string()),
            title: "Card".to_string(),
            author: Some("Jane".to_string()),
            posted_date: None,
        }
    }

    fn episode(language: &str, path: &str) -> AudioEpisode {
        AudioEpisode {
            language: language.to_string(),
            url: format!("https://cdn.example.com{}", path),
            source_id: path.to_string(),
            title: "Episode".to_string(),
            description: Some("About".to_string()),
            published: None,
            author: None,
            thumbnail: None,
        }
    }

    fn snapshot() -> WebResourceTree {
        let card = Story {
            title: "Card".to_string(),
            author: None,
            posted_date: None,
            languages: BTreeMap::from([
                ("isiXhosa".to_string(), localized("isiXhosa", "https://example.com/c-xh.pdf")),
                ("English".to_string(), localized("English", "https://example.com/c-en.PDF")),
            ]),
        };
        let mut cards = BTreeMap::new();
        cards.insert("English".to_string(), vec![card.clone()]);
        cards.insert("isiXhosa".to_string(), vec![card]);

        WebResourceTree {
            kind: TreeKind::WebResourceTree,
            title: "Nal'ibali".to_string(),
            language: "en".to_string(),
            children: vec![
                Hierarchy {
                    category: Category::AudioStories,
                    title: "Audio stories".to_string(),
                    url: "https://example.com/audio".to_string(),
                    thumbnail: Some("https://example.com/audio.png".to_string()),
                    description: Some("Listen".to_string()),
                    children: HierarchyChildren::AudioEpisodes(BTreeMap::from([
                        (
                            "English".to_string(),
                            vec![episode("English", "/e1.mp3"), episode("English", "/e2.mp3")],
                        ),
                        ("Sesotho".to_string(), vec![episode("Sesotho", "/s1.mp3")]),
                    ])),
                },
                Hierarchy {
                    category: Category::StoryCards,
                    title: "Story cards".to_string(),
                    url: "https://example.com/cards".to_string(),
                    thumbnail: None,
                    description: None,
                    children: HierarchyChildren::Stories(cards),
                },
            ],
        }
    }

    #[test]
    fn test_document_node_requires_pdf() {
        let config = TransformConfig::default();
        let story = localized("English", "https://example.com/card.docx");
        let url = Url::parse(&story.url).unwrap();
        assert!(matches!(
            document_node(&story, &url, &config),
            Err(TransformError::UnsupportedFormat(_))
        ));

        let story = localized("isiXhosa", "https://example.com/files/card.pdf");
        let url = Url::parse(&story.url).unwrap();
        let node = document_node(&story, &url, &config).unwrap();
        assert_eq!(node.source_id(), "/files/card.pdf");
        assert_eq!(node.info().language, "xh");
        assert_eq!(
            node.files(),
            &[FileRef::Document {
                url: "https://example.com/files/card.pdf".to_string()
            }]
        );
    }

    #[test]
    fn test_audio_node() {
        let node = audio_node(&episode("Sesotho", "/s1.mp3"), &TransformConfig::default());
        assert!(matches!(node, ContentNode::Audio(_)));
        assert_eq!(node.source_id(), "/s1.mp3");
        assert_eq!(node.info().language, "st");
        assert_eq!(
            node.files(),
            &[FileRef::Audio {
                url: "https://cdn.example.com/s1.mp3".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_transform_builds_topics_per_hierarchy_and_language() {
        let client = HttpClient::new().unwrap();
        let config = TransformConfig::default();
        let root = transform(&client, &snapshot(), &config).await.unwrap();

        assert_eq!(root.info().title, "Nal'ibali");
        let hierarchies = root.children();
        assert_eq!(hierarchies.len(), 2);

        let audio = &hierarchies[0];
        assert_eq!(audio.info().title, "Audio stories");
        assert_eq!(audio.info().thumbnail.as_deref(), Some("https://example.com/audio.png"));
        assert_eq!(audio.info().description.as_deref(), Some("Listen"));
        let audio_languages: Vec<&str> = audio
            .children()
            .iter()
            .map(|topic| topic.info().title.as_str())
            .collect();
        assert_eq!(audio_languages, vec!["English", "Sesotho"]);
        let english: Vec<&str> = audio.children()[0]
            .children()
            .iter()
            .map(ContentNode::source_id)
            .collect();
        assert_eq!(english, vec!["/e1.mp3", "/e2.mp3"]);

        let cards = &hierarchies[1];
        assert_eq!(cards.children().len(), 2);
        assert_eq!(cards.children()[1].info().language, "xh");
        assert_eq!(cards.children()[1].children()[0].source_id(), "/c-xh.pdf");
    }

    #[tokio::test]
    async fn test_transform_is_repeatable() {
        let client = HttpClient::new().unwrap();
        let config = TransformConfig::default();
        let tree = snapshot();

        let first = transform(&client, &tree, &config).await.unwrap();
        let second = transform(&client, &tree, &config).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_non_pdf_story_card_is_fatal() {
        let mut tree = snapshot();
        if let HierarchyChildren::Stories(cards) = &mut tree.children[1].children {
            let story = &mut cards.get_mut("English").unwrap()[0];
            story.languages.get_mut("English").unwrap().url =
                "https://example.com/c-en.html".to_string();
        }

        let client = HttpClient::new().unwrap();
        let result = transform(&client, &tree, &TransformConfig::default()).await;
        assert!(matches!(result, Err(TransformError::UnsupportedFormat(_))));
    }
}
