//! Content node model produced by the transform stage

use serde::Serialize;
use std::path::PathBuf;

/// Licence attached to every node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    /// Licence identifier, e.g. "CC BY-NC-ND"
    pub license_id: String,
    pub copyright_holder: String,
}

impl License {
    pub fn new(license_id: impl Into<String>, copyright_holder: impl Into<String>) -> Self {
        Self {
            license_id: license_id.into(),
            copyright_holder: copyright_holder.into(),
        }
    }
}

/// Fields shared by every node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub source_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Language code
    pub language: String,
    pub license: License,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// A file attached to a leaf node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "file_type", rename_all = "snake_case")]
pub enum FileRef {
    /// Local zip of a rendered HTML page
    Html5Zip { path: PathBuf },

    /// Remote audio file
    Audio { url: String },

    /// Remote document
    Document { url: String },
}

/// Navigation node owning an ordered list of children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicNode {
    #[serde(flatten)]
    pub info: NodeInfo,
    pub children: Vec<ContentNode>,
}

/// Content node with attached files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafNode {
    #[serde(flatten)]
    pub info: NodeInfo,
    pub files: Vec<FileRef>,
}

/// A unit of final output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentNode {
    Topic(TopicNode),
    Html5(LeafNode),
    Audio(LeafNode),
    Document(LeafNode),
}

impl ContentNode {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Self::Topic(topic) => &topic.info,
            Self::Html5(leaf) | Self::Audio(leaf) | Self::Document(leaf) => &leaf.info,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.info().source_id
    }

    /// Children of a topic; leaves have none
    pub fn children(&self) -> &[ContentNode] {
        match self {
            Self::Topic(topic) => &topic.children,
            _ => &[],
        }
    }

    /// Files of a leaf; topics have none
    pub fn files(&self) -> &[FileRef] {
        match self {
            Self::Topic(_) => &[],
            Self::Html5(leaf) | Self::Audio(leaf) | Self::Document(leaf) => &leaf.files,
        }
    }
}
