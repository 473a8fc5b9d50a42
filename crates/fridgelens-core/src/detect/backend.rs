//! Detection backend trait and request/response types.
//!
//! Defines the interface that every remote detection model implements, plus
//! the factory that builds the right backend from a name and the config.

use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

use super::credentials::resolve_api_key;
use super::network;
use crate::config::Config;
use crate::error::{ConfigError, DetectError, FridgeError};
use crate::types::Prediction;

/// Base64-encoded image ready to send to a remote model.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Encode raw image bytes with their MIME type.
    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }
}

/// One call to a backend.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// The image to analyze
    pub image: ImageInput,
    /// Overrides the backend's bound credential for this call
    pub api_key: Option<String>,
}

/// Normalized backend answer.
#[derive(Debug, Clone)]
pub struct BackendOutput {
    /// Predictions in backend order
    pub predictions: Vec<Prediction>,
    /// Raw response body, kept for diagnostics
    pub raw: String,
}

/// Trait that all detection backends implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the detector holds an `Arc<dyn DetectionBackend>`).
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    /// Backend name for logging and results (e.g., "gemini").
    fn name(&self) -> &str;

    /// Host resolved by the network pre-check, if the backend is remote.
    fn host(&self) -> Option<String>;

    /// Send one image and normalize the answer into predictions.
    async fn detect(&self, request: &BackendRequest) -> Result<BackendOutput, DetectError>;

    /// Per-request timeout for this backend.
    fn timeout(&self) -> Duration;

    /// Fail fast when the backend host cannot be resolved.
    async fn check_network(&self) -> Result<(), DetectError> {
        match self.host() {
            Some(host) => network::check_dns(&host).await,
            None => Ok(()),
        }
    }
}

/// Factory that creates the appropriate backend from a name and config.
pub struct DetectorFactory;

impl DetectorFactory {
    /// Names accepted by [`DetectorFactory::create`].
    pub const BACKENDS: &'static [&'static str] = &["roboflow", "gemini"];

    /// Create a backend.
    ///
    /// # Arguments
    /// * `backend` - Backend identifier ("roboflow" or "gemini")
    /// * `config` - The full config
    /// * `api_key` - Explicit credential; wins over environment and config
    /// * `model_override` - Optional model name that overrides the config default
    pub fn create(
        backend: &str,
        config: &Config,
        api_key: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Box<dyn DetectionBackend>, FridgeError> {
        let timeout_ms = config.detector.timeout_ms;
        match backend {
            "roboflow" => {
                let cfg = &config.roboflow;
                let key = resolve_api_key(api_key, "ROBOFLOW_API_KEY", &cfg.api_key).ok_or_else(
                    || DetectError::MissingCredential {
                        backend: "roboflow".to_string(),
                        env_var: "ROBOFLOW_API_KEY".to_string(),
                    },
                )?;
                let model_id = model_override.unwrap_or(&cfg.model_id);
                Ok(Box::new(super::roboflow::RoboflowBackend::new(
                    &cfg.endpoint,
                    model_id,
                    &key,
                    cfg.confidence,
                    timeout_ms,
                )))
            }
            "gemini" => {
                let cfg = &config.gemini;
                let key = resolve_api_key(api_key, "GEMINI_API_KEY", &cfg.api_key).ok_or_else(
                    || DetectError::MissingCredential {
                        backend: "gemini".to_string(),
                        env_var: "GEMINI_API_KEY".to_string(),
                    },
                )?;
                let model = model_override.unwrap_or(&cfg.model);
                Ok(Box::new(super::gemini::GeminiBackend::new(
                    &cfg.endpoint,
                    model,
                    &key,
                    timeout_ms,
                )))
            }
            other => Err(ConfigError::ValidationError(format!(
                "unknown detection backend {other:?} (expected one of {:?})",
                Self::BACKENDS
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_image_input_from_bytes() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(input.media_type, "image/jpeg");
        assert_eq!(input.data, "/9j/");
    }

    #[test]
    fn test_factory_explicit_key() {
        let config = Config::default();
        let backend = DetectorFactory::create("gemini", &config, Some("k"), None).unwrap();
        assert_eq!(backend.name(), "gemini");
        assert_eq!(
            backend.host().as_deref(),
            Some("generativelanguage.googleapis.com")
        );
    }

    #[test]
    fn test_factory_config_key_for_roboflow() {
        let mut config = Config::default();
        config.roboflow.api_key = "from-config".into();
        let backend = DetectorFactory::create("roboflow", &config, None, None).unwrap();
        assert_eq!(backend.name(), "roboflow");
        assert_eq!(backend.timeout(), Duration::from_secs(180));
    }

    #[test]
    fn test_factory_fails_closed_without_key() {
        let mut config = Config::default();
        config.gemini.api_key = "${FRIDGELENS_TEST_UNSET_KEY_8841}".into();
        // GEMINI_API_KEY may be set on a developer machine; only assert when it isn't.
        if std::env::var("GEMINI_API_KEY").is_err() {
            let err = DetectorFactory::create("gemini", &config, None, None)
                .err()
                .unwrap();
            match err {
                FridgeError::Detect(e) => assert_eq!(e.kind(), ErrorKind::AuthenticationError),
                other => panic!("expected a detection error, got {other}"),
            }
        }
    }

    #[test]
    fn test_factory_unknown_backend() {
        let config = Config::default();
        let err = DetectorFactory::create("yolo", &config, Some("k"), None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown detection backend"));
    }
}
