//! Persistence for the chef's JSON trees
//!
//! The crawl stage writes the web resource tree once; the transform stage
//! reads it back and writes the final content tree next to it. Both live in
//! the trees directory under the chef's data directory.

use serde::{de::DeserializeOwned, Serialize};
use std::{io, path::Path, path::PathBuf};
use tokio::fs;
use tracing::info;

use crate::crawler::WebResourceTree;
use crate::error::Error as CrateError;
use crate::transform::ContentNode;

/// File name of the crawl stage output
pub const WEB_RESOURCE_TREE: &str = "web_resource_tree.json";

/// File name of the transform stage output
pub const CONTENT_TREE: &str = "ricecooker_json_tree.json";

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the trees
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("chefdata/trees"),
        }
    }
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for CrateError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => CrateError::Io(e),
            StorageError::Json(e) => CrateError::Json(e),
            StorageError::NotFound(path) => CrateError::Other(format!("Not found: {}", path)),
        }
    }
}

type Result<T> = std::result::Result<T, StorageError>;

/// Storage manager for tree snapshots
#[derive(Debug, Clone)]
pub struct Storage {
    config: StorageConfig,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Create a new storage with default configuration
    pub fn new() -> Self {
        Self {
            config: StorageConfig::default(),
        }
    }

    /// Create a new storage with custom configuration
    pub fn with_config(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Path of a tree file
    pub fn path(&self, name: &str) -> PathBuf {
        self.config.base_path.join(name)
    }

    /// Creates necessary directories for storage
    async fn ensure_directories(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let path = self.path(name);
        self.ensure_directories(&path).await?;

        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).await?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(path.display().to_string()));
        }

        let json = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the crawl stage snapshot
    pub async fn write_web_resource_tree(&self, tree: &WebResourceTree) -> Result<PathBuf> {
        self.write_json(WEB_RESOURCE_TREE, tree).await
    }

    /// Read the crawl stage snapshot
    pub async fn read_web_resource_tree(&self) -> Result<WebResourceTree> {
        self.read_json(WEB_RESOURCE_TREE).await
    }

    /// Write the final content tree
    pub async fn write_content_tree(&self, tree: &ContentNode) -> Result<PathBuf> {
        self.write_json(CONTENT_TREE, tree).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{Category, Hierarchy, HierarchyChildren, LocalizedStory, Story, TreeKind};
    use std::collections::BTreeMap;

    fn sample_tree() -> WebResourceTree {
        let localized = LocalizedStory {
            language: "English".to_string(),
            url: "https://example.com/stories/hat".to_string(),
            thumbnail: None,
            title: "The Lost Hat".to_string(),
            author: Some("Jane".to_string()),
            posted_date: None,
        };
        let story = Story {
            title: "The Lost Hat".to_string(),
            author: Some("Jane".to_string()),
            posted_date: None,
            languages: BTreeMap::from([("English".to_string(), localized)]),
        };

        WebResourceTree {
            kind: TreeKind::WebResourceTree,
            title: "Nal'ibali".to_string(),
            language: "en".to_string(),
            children: vec![Hierarchy {
                category: Category::MultilingualStories,
                title: "Multilingual stories".to_string(),
                url: "https://example.com/multilingual".to_string(),
                thumbnail: None,
                description: Some("All languages".to_string()),
                children: HierarchyChildren::Stories(BTreeMap::from([(
                    "English".to_string(),
                    vec![story],
                )])),
            }],
        }
    }

    #[test]
    fn test_default_paths() {
        let storage = Storage::new();
        assert_eq!(
            storage.path(WEB_RESOURCE_TREE),
            Path::new("chefdata/trees/web_resource_tree.json")
        );
        assert_eq!(
            storage.path(CONTENT_TREE),
            Path::new("chefdata/trees/ricecooker_json_tree.json")
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::with_config(StorageConfig {
            base_path: dir.path().join("trees"),
        });

        let tree = sample_tree();
        let path = storage.write_web_resource_tree(&tree).await.unwrap();
        assert!(path.exists());

        let loaded = storage.read_web_resource_tree().await.unwrap();
        assert_eq!(loaded, tree);
    }

    #[tokio::test]
    async fn test_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::with_config(StorageConfig {
            base_path: dir.path().to_path_buf(),
        });

        match storage.read_web_resource_tree().await {
            Err(StorageError::NotFound(path)) => assert!(path.ends_with(WEB_RESOURCE_TREE)),
            other => panic!("Expected NotFound error, got {:?}", other.map(|t| t.title)),
        }
    }
}
