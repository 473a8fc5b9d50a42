//! Core data types for ingredient detection.
//!
//! Everything here is request-scoped: a request goes in, a result comes out,
//! and nothing is kept between invocations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorKind;

/// Reference to the image being analyzed.
#[derive(Debug, Clone)]
pub enum ImageRef {
    /// An image file on disk
    Path(PathBuf),
    /// Image bytes already in memory (e.g. an HTTP upload)
    Bytes { name: String, bytes: Vec<u8> },
}

impl ImageRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        ImageRef::Path(path.into())
    }

    pub fn bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageRef::Bytes {
            name: name.into(),
            bytes,
        }
    }

    /// Human-readable name used in results and log lines.
    pub fn display_name(&self) -> String {
        match self {
            ImageRef::Path(path) => path.display().to_string(),
            ImageRef::Bytes { name, .. } => name.clone(),
        }
    }

    /// Filesystem path, if this reference points at a file.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ImageRef::Path(path) => Some(path),
            ImageRef::Bytes { .. } => None,
        }
    }
}

/// A single detection request.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    /// The image to analyze
    pub image: ImageRef,
    /// Credential override for this request only
    pub api_key: Option<String>,
}

impl DetectionRequest {
    pub fn new(image: ImageRef) -> Self {
        Self {
            image,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Axis-aligned box in pixel coordinates; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build a box from center coordinates, as object detectors report them.
    pub fn from_center(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }
}

/// One detected ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Ingredient name (e.g. "milk", "卵")
    pub label: String,

    /// Confidence score from 0.0 to 1.0, when the backend reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Location in the image, when the backend reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Prediction {
    /// A bare label with no confidence or location.
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            confidence: None,
            bbox: None,
        }
    }
}

/// Outcome of running one image through a detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Display name of the analyzed image
    pub image: String,

    /// Backend that produced the result
    pub backend: String,

    /// Predictions in backend order
    pub predictions: Vec<Prediction>,

    /// Raw backend payload, for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,

    /// Set when detection failed; predictions are then empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,

    /// Human-readable failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Round-trip latency of the backend call in milliseconds
    pub latency_ms: u64,
}

impl DetectionResult {
    /// A degraded result: no predictions, error tag set.
    pub fn degraded(
        image: impl Into<String>,
        backend: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
        raw: Option<String>,
    ) -> Self {
        Self {
            image: image.into(),
            backend: backend.into(),
            predictions: Vec::new(),
            raw,
            error: Some(kind),
            error_message: Some(message.into()),
            latency_ms: 0,
        }
    }

    /// Whether this result carries an error tag.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Ingredient names in prediction order (duplicates kept).
    pub fn ingredients(&self) -> Vec<&str> {
        self.predictions.iter().map(|p| p.label.as_str()).collect()
    }
}

/// Unique ingredient names collected across several results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedIngredients {
    /// Sorted, deduplicated ingredient names
    pub ingredients: Vec<String>,
    /// Results without an error tag
    pub succeeded: usize,
    /// Results with an error tag
    pub failed: usize,
}

impl AggregatedIngredients {
    /// True when at least one result was seen and none failed.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded > 0
    }
}
