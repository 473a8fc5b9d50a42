//! Configuration management for fridgelens.
//!
//! Configuration is loaded from the platform config directory
//! (`config.toml`) with sensible defaults, or from an explicit path.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detector selection, timeouts and retries
    pub detector: DetectorConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Image discovery settings
    pub discovery: DiscoveryConfig,

    /// Roboflow hosted inference settings
    pub roboflow: RoboflowConfig,

    /// Gemini settings
    pub gemini: GeminiConfig,

    /// HTTP analysis endpoint settings
    pub server: ServerConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.fridgelens.fridgelens/config.toml
    /// - Linux: ~/.config/fridgelens/config.toml
    ///
    /// Falls back to ~/.fridgelens/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "fridgelens", "fridgelens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".fridgelens").join("config.toml")
            })
    }

    /// Resolved default image directory (with ~ expansion).
    pub fn image_dir(&self) -> PathBuf {
        expand_path(&self.discovery.image_dir)
    }

    /// Resolved stub sample image path (with ~ expansion).
    pub fn sample_image(&self) -> PathBuf {
        expand_path(&self.server.sample_image)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Expand a leading `~` in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
