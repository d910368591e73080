//! Writer configuration
//!
//! Loaded from YAML or JSON. Only the staging category, the source node and
//! the storage location are configurable.

use crate::error::{Error, Result};
use crate::stage::{FileStagingManager, MemoryStagingManager, StagingManager};
use crate::types::category;
use crate::writer::DEFAULT_PREVIEW_CHARS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for a staging writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Staging category (namespace for resources)
    #[serde(default = "default_category")]
    pub category: String,

    /// Node the writer stages batches for
    pub source_node_id: String,

    /// Maximum characters of content shown in debug logs
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Directory for file-backed staging; in-memory when unset
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
}

fn default_category() -> String {
    category::OUTGOING.to_string()
}

fn default_preview_chars() -> usize {
    DEFAULT_PREVIEW_CHARS
}

impl WriterConfig {
    /// Create a config with defaults for everything but the node id
    pub fn new(source_node_id: impl Into<String>) -> Self {
        Self {
            category: default_category(),
            source_node_id: source_node_id.into(),
            preview_chars: default_preview_chars(),
            staging_dir: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.staging_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.source_node_id.trim().is_empty() {
            return Err(Error::missing_field("source_node_id"));
        }
        if self.category.trim().is_empty() {
            return Err(Error::invalid_value("category", "must not be empty"));
        }
        if self.preview_chars == 0 {
            return Err(Error::invalid_value(
                "preview_chars",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Build the staging manager this config describes
    pub fn build_manager(&self) -> Arc<dyn StagingManager> {
        match &self.staging_dir {
            Some(dir) => Arc::new(FileStagingManager::new(dir)),
            None => Arc::new(MemoryStagingManager::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_yaml_defaults() {
        let config = WriterConfig::from_yaml_str("source_node_id: n1\n").unwrap();
        assert_eq!(config, WriterConfig::new("n1"));
        assert_eq!(config.category, "outgoing");
        assert_eq!(config.preview_chars, 1000);
        assert!(config.staging_dir.is_none());
    }

    #[test]
    fn test_yaml_full() {
        let yaml = r"
category: incoming
source_node_id: corp-000
preview_chars: 80
staging_dir: /var/lib/staging
";
        let config = WriterConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.category, "incoming");
        assert_eq!(config.source_node_id, "corp-000");
        assert_eq!(config.preview_chars, 80);
        assert_eq!(config.staging_dir, Some(PathBuf::from("/var/lib/staging")));
    }

    #[test]
    fn test_json_config() {
        let config =
            WriterConfig::from_json_str(r#"{"source_node_id": "n2", "category": "outgoing"}"#)
                .unwrap();
        assert_eq!(config.source_node_id, "n2");
    }

    #[test]
    fn test_missing_node_id_is_parse_error() {
        let err = WriterConfig::from_yaml_str("category: outgoing\n").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let err = WriterConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { .. }));

        let err = WriterConfig::new("n1").with_category("").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));

        let err = WriterConfig::new("n1")
            .with_preview_chars(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("preview_chars"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("writer.yaml");
        std::fs::write(&path, "source_node_id: n9\ncategory: incoming\n").unwrap();

        let config = WriterConfig::from_file(&path).unwrap();
        assert_eq!(config.source_node_id, "n9");
        assert_eq!(config.category, "incoming");
    }

    #[test]
    fn test_from_missing_file() {
        let err = WriterConfig::from_file("/nonexistent/writer.yaml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
