//! Application configuration
//!
//! YAML config file with serde defaults; a missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Board behaviour
    #[serde(default)]
    pub board: BoardSettings,

    /// Data source settings
    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Load configuration from a YAML file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Board behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    /// Whether drag-rank ordering is enabled for the workspace.
    #[serde(default = "default_true")]
    pub ranking_enabled: bool,

    /// Description shown while the board loads.
    #[serde(default = "default_load_description")]
    pub load_description: String,
}

fn default_true() -> bool {
    true
}

fn default_load_description() -> String {
    "Portfolio Estimation Board".to_string()
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            ranking_enabled: default_true(),
            load_description: default_load_description(),
        }
    }
}

/// Data source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSettings {
    /// Dataset file to serve types, states and items from.
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/definitely/not/here.yaml")).unwrap();
        assert!(config.board.ranking_enabled);
        assert_eq!(config.board.load_description, "Portfolio Estimation Board");
        assert!(config.data.path.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "board:\n  ranking_enabled: false").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!(!config.board.ranking_enabled);
        assert_eq!(config.board.load_description, "Portfolio Estimation Board");
    }

    #[test]
    fn test_full_file_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "board:\n  ranking_enabled: true\n  load_description: Quarterly Board\ndata:\n  path: fixtures/portfolio.json"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.board.load_description, "Quarterly Board");
        assert_eq!(
            config.data.path.as_deref(),
            Some(Path::new("fixtures/portfolio.json"))
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "board: [not, a, mapping]").unwrap();

        let result = AppConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
