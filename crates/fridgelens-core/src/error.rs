//! Error types for ingredient detection.
//!
//! Errors are split by concern: configuration problems are fatal at startup,
//! while [`DetectError`] covers everything that can go wrong for a single
//! image and maps onto the serializable [`ErrorKind`] tag carried by degraded
//! results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for fridgelens operations.
#[derive(Error, Debug)]
pub enum FridgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Detection errors
    #[error("Detection error: {0}")]
    Detect(#[from] DetectError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image encode/decode errors outside the detection path
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while detecting ingredients in one image.
#[derive(Error, Debug)]
pub enum DetectError {
    /// The image path does not exist
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    /// The image could not be read, recognized, or decoded
    #[error("Decode error for {image}: {message}")]
    ImageDecode { image: String, message: String },

    /// The backend rejected the credential
    #[error("{backend} rejected the credential (HTTP {status_code}): {message}")]
    Authentication {
        backend: String,
        status_code: u16,
        message: String,
    },

    /// No credential was supplied through any channel
    #[error("No API key for {backend}. Pass --api-key or set {env_var}.")]
    MissingCredential { backend: String, env_var: String },

    /// The backend is overloaded, down, or unreachable at the transport level
    #[error("{backend} unavailable: {message}")]
    ServiceUnavailable {
        backend: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The backend did not answer within the configured timeout
    #[error("{backend} timed out after {timeout_ms}ms")]
    Timeout { backend: String, timeout_ms: u64 },

    /// The backend answered, but not in a shape we can normalize
    #[error("Failed to parse {backend} response: {message}")]
    ResponseParse {
        backend: String,
        message: String,
        /// Raw response body, kept for diagnostics
        raw: Option<String>,
    },

    /// DNS pre-check failed before any request was attempted
    #[error("DNS resolution failed for {host}: {message}. Check your network, DNS, firewall or proxy settings.")]
    NetworkUnreachable { host: String, message: String },
}

/// Serializable tag recorded on a degraded detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ImageNotFound,
    ImageDecodeError,
    AuthenticationError,
    ServiceUnavailable,
    Timeout,
    ResponseParseError,
    NetworkUnreachable,
}

impl ErrorKind {
    /// Wire name of the tag (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ImageNotFound => "image_not_found",
            ErrorKind::ImageDecodeError => "image_decode_error",
            ErrorKind::AuthenticationError => "authentication_error",
            ErrorKind::ServiceUnavailable => "service_unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ResponseParseError => "response_parse_error",
            ErrorKind::NetworkUnreachable => "network_unreachable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DetectError {
    /// The tag recorded on a degraded result for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectError::ImageNotFound(_) => ErrorKind::ImageNotFound,
            DetectError::ImageDecode { .. } => ErrorKind::ImageDecodeError,
            DetectError::Authentication { .. } | DetectError::MissingCredential { .. } => {
                ErrorKind::AuthenticationError
            }
            DetectError::ServiceUnavailable { .. } => ErrorKind::ServiceUnavailable,
            DetectError::Timeout { .. } => ErrorKind::Timeout,
            DetectError::ResponseParse { .. } => ErrorKind::ResponseParseError,
            DetectError::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
        }
    }

    /// Raw backend payload attached to the error, if any.
    pub fn raw(&self) -> Option<&str> {
        match self {
            DetectError::ResponseParse { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }

    /// Classify a non-success HTTP status from a backend.
    ///
    /// Every status other than 401/403 is reported as `ServiceUnavailable`
    /// with the code kept; [`is_retryable`](crate::detect::retry::is_retryable)
    /// only retries 429 and 5xx.
    pub fn from_status(backend: &str, status_code: u16, body: String) -> Self {
        match status_code {
            401 | 403 => DetectError::Authentication {
                backend: backend.to_string(),
                status_code,
                message: body,
            },
            _ => DetectError::ServiceUnavailable {
                backend: backend.to_string(),
                message: format!("HTTP {status_code}: {body}"),
                status_code: Some(status_code),
            },
        }
    }

    /// Classify a transport-level reqwest failure.
    ///
    /// The request URL is stripped from the message: it may carry a
    /// credential in its query string.
    pub fn from_transport(backend: &str, err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            DetectError::Timeout {
                backend: backend.to_string(),
                timeout_ms,
            }
        } else {
            DetectError::ServiceUnavailable {
                backend: backend.to_string(),
                message: format!("request failed: {}", err.without_url()),
                status_code: None,
            }
        }
    }
}

/// Convenience type alias for fridgelens results.
pub type Result<T> = std::result::Result<T, FridgeError>;

/// Convenience type alias for detection results.
pub type DetectResult<T> = std::result::Result<T, DetectError>;
