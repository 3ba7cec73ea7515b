//! # Transform Configuration Module
//!
//! Configuration for the transform stage: how story pages are cut down to
//! their content, the licence stamped on every node, and where scratch and
//! archive files are written.

use std::path::PathBuf;

use crate::transform::License;

/// Configuration for the transform stage
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Selector for the main section of a story page
    pub content_selector: String,

    /// Selector for the cross-language widget removed from the main section
    pub language_widget_selector: String,

    /// Licence attached to every node
    pub license: License,

    /// Directory where each story's assets are collected before zipping
    pub scratch_dir: PathBuf,

    /// Directory receiving the content-addressed zip archives
    pub zip_dir: PathBuf,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            content_selector: "article, #main-content, main".to_string(),
            language_widget_selector: ".story-languages, .language-switcher".to_string(),
            license: License::new("CC BY-NC-ND", "Nal'ibali"),
            scratch_dir: PathBuf::from("chefdata/scratch"),
            zip_dir: PathBuf::from("chefdata/zipfiles"),
        }
    }
}

/// Builder for TransformConfig
#[derive(Debug, Default)]
pub struct TransformConfigBuilder {
    config: TransformConfig,
}

impl TransformConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: TransformConfig::default(),
        }
    }

    /// Set the selector for the main section of a story page
    pub fn content_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.content_selector = selector.into();
        self
    }

    /// Set the selector for the language widget
    pub fn language_widget_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.language_widget_selector = selector.into();
        self
    }

    /// Set the licence attached to every node
    pub fn license(mut self, license: License) -> Self {
        self.config.license = license;
        self
    }

    /// Set the scratch directory
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = dir.into();
        self
    }

    /// Set the archive directory
    pub fn zip_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.zip_dir = dir.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> TransformConfig {
        self.config
    }
}

impl TransformConfig {
    /// Create a new builder
    pub fn builder() -> TransformConfigBuilder {
        TransformConfigBuilder::new()
    }
}
