//! Fallback configuration
//!
//! Defaults match the shader locations shipped with the driver package.
//! A JSON file may override them; `XCLIPSE_SIDE_LOG` and
//! `XCLIPSE_TUNE_REPORT` override the output locations.

use crate::job::DEFAULT_MAX_FORMAT_ID_LEN;
use crate::resolver::{SearchPath, DEFAULT_SEARCH_PATHS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_SIDE_LOG: &str = "XCLIPSE_SIDE_LOG";
pub const ENV_TUNE_REPORT: &str = "XCLIPSE_TUNE_REPORT";

pub const DEFAULT_SIDE_LOG: &str = "/data/local/tmp/xeno_wrapper.log";
pub const PACKAGE_SIDE_LOG: &str = "/var/log/xeno_wrapper.log";
pub const DEFAULT_TUNE_REPORT: &str = "/data/local/tmp/xeno_tune_report.json";

/// Configuration for fallback resolution and its outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Shader directories, probed in order
    pub search_paths: Vec<PathBuf>,

    /// Cap on stored format names, in bytes
    pub max_format_id_len: usize,

    /// Side log file, in addition to stderr
    pub side_log: Option<PathBuf>,

    /// Where the tune report is written
    pub tune_report: PathBuf,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            search_paths: DEFAULT_SEARCH_PATHS.iter().copied().map(PathBuf::from).collect(),
            max_format_id_len: DEFAULT_MAX_FORMAT_ID_LEN,
            side_log: Some(PathBuf::from(DEFAULT_SIDE_LOG)),
            tune_report: PathBuf::from(DEFAULT_TUNE_REPORT),
        }
    }
}

impl FallbackConfig {
    /// Load from a JSON file; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `XCLIPSE_SIDE_LOG` / `XCLIPSE_TUNE_REPORT` from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(log) = lookup(ENV_SIDE_LOG).filter(|v| !v.is_empty()) {
            self.side_log = Some(PathBuf::from(log));
        }
        if let Some(report) = lookup(ENV_TUNE_REPORT).filter(|v| !v.is_empty()) {
            self.tune_report = PathBuf::from(report);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_paths.is_empty() {
            return Err(ConfigError::EmptySearchPath);
        }

        if self.max_format_id_len == 0 {
            return Err(ConfigError::ZeroFormatIdLength);
        }

        Ok(())
    }

    pub fn search_path(&self) -> SearchPath {
        SearchPath::new(self.search_paths.iter().cloned())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("At least one shader search path is required")]
    EmptySearchPath,

    #[error("max_format_id_len must be greater than zero")]
    ZeroFormatIdLength,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = FallbackConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_paths.len(), 3);
        assert_eq!(config.max_format_id_len, 63);
        assert_eq!(config.search_path().dirs(), SearchPath::default().dirs());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bcfallback.json");
        std::fs::write(&path, r#"{ "search_paths": ["/opt/shaders/"] }"#).unwrap();

        let config = FallbackConfig::load(&path).unwrap();
        assert_eq!(config.search_paths, vec![PathBuf::from("/opt/shaders/")]);
        assert_eq!(config.max_format_id_len, DEFAULT_MAX_FORMAT_ID_LEN);
    }

    #[test]
    fn test_load_rejects_empty_search_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bcfallback.json");
        std::fs::write(&path, r#"{ "search_paths": [] }"#).unwrap();

        assert!(matches!(
            FallbackConfig::load(&path),
            Err(ConfigError::EmptySearchPath)
        ));
    }

    #[test]
    fn test_load_bad_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bcfallback.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FallbackConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            FallbackConfig::load(&temp.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = FallbackConfig::default().with_overrides_from(|name| match name {
            ENV_SIDE_LOG => Some("/tmp/side.log".to_string()),
            ENV_TUNE_REPORT => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.side_log, Some(PathBuf::from("/tmp/side.log")));
        assert_eq!(config.tune_report, PathBuf::from(DEFAULT_TUNE_REPORT));
    }
}
