//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const KNOWN_BACKENDS: &[&str] = &["roboflow", "gemini"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !KNOWN_BACKENDS.contains(&self.detector.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "detector.backend must be one of {KNOWN_BACKENDS:?}, got {:?}",
                self.detector.backend
            )));
        }
        if self.detector.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "detector.timeout_ms must be > 0".into(),
            ));
        }
        if self.detector.parallel == 0 {
            return Err(ConfigError::ValidationError(
                "detector.parallel must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.discovery.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "discovery.supported_formats must not be empty".into(),
            ));
        }
        if self.roboflow.confidence > 100 {
            return Err(ConfigError::ValidationError(
                "roboflow.confidence must be between 0 and 100".into(),
            ));
        }
        if self.server.max_upload_mb == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_upload_mb must be > 0".into(),
            ));
        }
        Ok(())
    }
}
