//! The detector: validates an image, sends it to a backend and turns the
//! outcome into a [`DetectionResult`].
//!
//! [`Detector::detect`] never fails. Every [`DetectError`] becomes a degraded
//! result carrying the error tag and no predictions, so a batch can keep
//! going after a bad image.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::backend::{BackendOutput, BackendRequest, DetectionBackend, DetectorFactory, ImageInput};
use super::retry;
use crate::config::{Config, DetectorConfig, LimitsConfig};
use crate::error::{DetectError, FridgeError};
use crate::pipeline::decode::format_to_mime;
use crate::pipeline::{ImageDecoder, Validator};
use crate::types::{DetectionRequest, DetectionResult, ImageRef};

/// Timeout and retry settings for backend calls.
#[derive(Debug, Clone)]
pub struct DetectOptions {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Retries after the first attempt (transient errors only)
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 180_000,
            retry_attempts: 0,
            retry_delay_ms: 1000,
        }
    }
}

impl From<&DetectorConfig> for DetectOptions {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            retry_attempts: config.retry_attempts,
            retry_delay_ms: config.retry_delay_ms,
        }
    }
}

/// Image-to-ingredients detector bound to one backend.
pub struct Detector {
    backend: Arc<dyn DetectionBackend>,
    validator: Validator,
    decoder: ImageDecoder,
    options: DetectOptions,
}

impl Detector {
    pub fn new(backend: Box<dyn DetectionBackend>, limits: LimitsConfig, options: DetectOptions) -> Self {
        Self {
            backend: Arc::from(backend),
            validator: Validator::new(limits.clone()),
            decoder: ImageDecoder::new(limits),
            options,
        }
    }

    /// Build a detector for the named backend from the config.
    ///
    /// Fails closed when no credential resolves.
    pub fn from_config(
        config: &Config,
        backend: &str,
        api_key: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Self, FridgeError> {
        let backend = DetectorFactory::create(backend, config, api_key, model_override)?;
        Ok(Self::new(
            backend,
            config.limits.clone(),
            DetectOptions::from(&config.detector),
        ))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// DNS pre-check of the backend host.
    pub async fn check_network(&self) -> Result<(), DetectError> {
        self.backend.check_network().await
    }

    /// Run detection on one image; failures come back as degraded results.
    pub async fn detect(&self, request: &DetectionRequest) -> DetectionResult {
        match self.try_detect(request).await {
            Ok(result) => result,
            Err(e) => {
                let image = request.image.display_name();
                tracing::error!(image = %image, kind = %e.kind(), "Detection failed: {e}");
                let raw = e.raw().map(str::to_string);
                DetectionResult::degraded(image, self.backend.name(), e.kind(), e.to_string(), raw)
            }
        }
    }

    /// Fallible form of [`Detector::detect`].
    pub async fn try_detect(&self, request: &DetectionRequest) -> Result<DetectionResult, DetectError> {
        let input = self.load(&request.image).await?;
        let backend_request = BackendRequest {
            image: input,
            api_key: request.api_key.clone(),
        };

        let start = Instant::now();
        let output = self.call_with_retry(&backend_request).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            image = %request.image.display_name(),
            backend = self.backend.name(),
            count = output.predictions.len(),
            latency_ms,
            "Detection complete"
        );

        Ok(DetectionResult {
            image: request.image.display_name(),
            backend: self.backend.name().to_string(),
            predictions: output.predictions,
            raw: Some(output.raw),
            error: None,
            error_message: None,
            latency_ms,
        })
    }

    /// Validate and decode the image, then encode its original bytes.
    async fn load(&self, image: &ImageRef) -> Result<ImageInput, DetectError> {
        let name = image.display_name();
        let bytes = match image {
            ImageRef::Path(path) => {
                self.validator.validate(path)?;
                tokio::fs::read(path).await.map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => DetectError::ImageNotFound(path.clone()),
                    _ => DetectError::ImageDecode {
                        image: name.clone(),
                        message: e.to_string(),
                    },
                })?
            }
            ImageRef::Bytes { bytes, .. } => {
                self.validator.validate_bytes(&name, bytes)?;
                bytes.clone()
            }
        };

        let decoded = self.decoder.decode_bytes(bytes.clone(), &name).await?;
        tracing::trace!(
            image = %name,
            width = decoded.width,
            height = decoded.height,
            "Decoded image"
        );
        Ok(ImageInput::from_bytes(&bytes, format_to_mime(decoded.format)))
    }

    async fn call_with_retry(&self, request: &BackendRequest) -> Result<BackendOutput, DetectError> {
        let timeout = Duration::from_millis(self.options.timeout_ms);
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(timeout, self.backend.detect(request)).await {
                Ok(result) => result,
                Err(_) => Err(DetectError::Timeout {
                    backend: self.backend.name().to_string(),
                    timeout_ms: self.options.timeout_ms,
                }),
            };

            match result {
                Err(e) if attempt < self.options.retry_attempts && retry::is_retryable(&e) => {
                    let delay = retry::backoff_duration(attempt, self.options.retry_delay_ms);
                    attempt += 1;
                    tracing::warn!(
                        "Retry {attempt}/{} on {} after {delay:?}: {e}",
                        self.options.retry_attempts,
                        self.backend.name()
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }
}
