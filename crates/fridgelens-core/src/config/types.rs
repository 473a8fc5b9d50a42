//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Detector selection, timeouts and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Default backend ("roboflow" or "gemini")
    pub backend: String,

    /// Per-request timeout for the remote model call in milliseconds
    pub timeout_ms: u64,

    /// Extra attempts on ServiceUnavailable / Timeout (0 = single attempt)
    pub retry_attempts: u32,

    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,

    /// Images processed concurrently in a batch (1 = sequential)
    pub parallel: usize,

    /// Resolve the backend host before the first request
    pub dns_precheck: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: "gemini".to_string(),
            timeout_ms: 180_000,
            retry_attempts: 0,
            retry_delay_ms: 1000,
            parallel: 1,
            dns_precheck: true,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Image discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory scanned when no --dir is given
    pub image_dir: PathBuf,

    /// Supported input extensions
    pub supported_formats: Vec<String>,

    /// Descend into subdirectories
    pub recursive: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("public/images/analyze_image_test"),
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "bmp".to_string(),
                "webp".to_string(),
            ],
            recursive: false,
        }
    }
}

/// Roboflow hosted object-detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoboflowConfig {
    /// Hosted inference endpoint
    pub endpoint: String,

    /// Model identifier ("project/version")
    pub model_id: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Minimum confidence requested from the server, in percent
    pub confidence: u32,
}

impl Default for RoboflowConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://detect.roboflow.com".to_string(),
            model_id: "fridgevision/3".to_string(),
            api_key: "${ROBOFLOW_API_KEY}".to_string(),
            confidence: 40,
        }
    }
}

/// Gemini generative model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API endpoint (without version path)
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
        }
    }
}

/// How `POST /analyze` answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Ignore the upload and return the fixed sample list
    #[default]
    Stub,
    /// Run the uploaded image through the configured detector
    Detect,
}

impl ServerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerMode::Stub => "stub",
            ServerMode::Detect => "detect",
        }
    }
}

/// HTTP analysis endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,

    /// Response mode
    pub mode: ServerMode,

    /// Fixed sample file checked in stub mode
    pub sample_image: PathBuf,

    /// Maximum multipart upload size in megabytes
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            mode: ServerMode::Stub,
            sample_image: PathBuf::from("public/images/analyze_image_test"),
            max_upload_mb: 10,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default per-image output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,

    /// Map common synonyms onto one canonical name before aggregating
    pub canonicalize: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
            canonicalize: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
