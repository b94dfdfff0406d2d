//! File set configuration loaded from TOML.
//!
//! ```toml
//! directory = "theme"
//! excludes = ["*.min.js", "config/settings_data.json"]
//! paths_relative_to = "unchanged"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::FileSetBuilder;
use crate::error::ConfigError;
use crate::fileset::{DEFAULT_CHANNEL_CAPACITY, FileSetSettings, PathMode};

/// Serializable description of a file set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSetConfig {
    /// Directory to enumerate.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Include globs. Empty selects everything not excluded.
    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,

    /// Add the standard editor/OS exclude list.
    #[serde(default = "default_true")]
    pub default_excludes: bool,

    #[serde(default)]
    pub paths_relative_to: PathMode,

    /// Paths buffered ahead of a stream consumer.
    #[serde(default = "default_capacity")]
    pub channel_capacity: usize,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for FileSetConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            includes: Vec::new(),
            excludes: Vec::new(),
            default_excludes: default_true(),
            paths_relative_to: PathMode::default(),
            channel_capacity: default_capacity(),
        }
    }
}

impl FileSetConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded file set config");
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        if config.channel_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(config)
    }

    pub fn settings(&self) -> FileSetSettings {
        FileSetSettings {
            paths_relative_to: self.paths_relative_to,
            channel_capacity: self.channel_capacity,
        }
    }

    /// A builder configured from this file. The filesystem is left at its
    /// default and can still be replaced.
    pub fn into_builder(self) -> FileSetBuilder {
        let settings = self.settings();
        let mut builder = FileSetBuilder::new()
            .in_dir(self.directory)
            .with_include(self.includes)
            .with_exclude(self.excludes)
            .with_settings(settings);
        if self.default_excludes {
            builder = builder.with_default_excludes();
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryFs;
    use std::sync::Arc;

    #[test]
    fn empty_document_uses_defaults() {
        let config = FileSetConfig::from_toml_str("").unwrap();
        assert_eq!(config, FileSetConfig::default());
        assert!(config.default_excludes);
        assert_eq!(config.paths_relative_to, PathMode::Relative);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn parses_all_fields() {
        let config = FileSetConfig::from_toml_str(
            r#"
            directory = "theme"
            includes = ["assets/*", "*.liquid"]
            excludes = ["*.min.js"]
            default_excludes = false
            paths_relative_to = "absolute"
            channel_capacity = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.directory, PathBuf::from("theme"));
        assert_eq!(config.includes, vec!["assets/*", "*.liquid"]);
        assert_eq!(config.excludes, vec!["*.min.js"]);
        assert!(!config.default_excludes);
        assert_eq!(config.paths_relative_to, PathMode::Absolute);
        assert_eq!(config.channel_capacity, 2);
    }

    #[test]
    fn unknown_path_mode_is_rejected() {
        let err = FileSetConfig::from_toml_str(r#"paths_relative_to = "cwd""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = FileSetConfig::from_toml_str("channel_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCapacity));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fileset.toml");
        std::fs::write(&path, "directory = \"src\"\nexcludes = [\"*.tmp\"]\n").unwrap();

        let config = FileSetConfig::load_from(&path).unwrap();
        assert_eq!(config.directory, PathBuf::from("src"));

        let missing = FileSetConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn builder_from_config_applies_patterns() {
        let fs = MemoryFs::new();
        fs.add_file("/theme/a.js", "")
            .add_file("/theme/a.min.js", "")
            .add_file("/theme/a.js.swp", "");
        let config = FileSetConfig::from_toml_str(
            r#"
            directory = "/theme"
            excludes = ["*.min.js"]
            "#,
        )
        .unwrap();

        let set = config
            .into_builder()
            .with_filesystem(Arc::new(fs))
            .build()
            .await
            .unwrap();
        assert_eq!(set.all_files().await, vec!["a.js"]);
    }
}
