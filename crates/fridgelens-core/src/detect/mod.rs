//! Ingredient detection against remote vision models.
//!
//! - **backend**: `DetectionBackend` trait and the name-based factory
//! - **roboflow**: Hosted object detection (structured predictions)
//! - **gemini**: Generative model returning free text
//! - **normalize**: Turns either response shape into ingredient names
//! - **detector**: Validation, timeout, retry, degraded results
//! - **runner**: Batch processing with ordered callbacks

pub mod backend;
pub mod credentials;
pub mod detector;
pub mod gemini;
pub mod network;
pub mod normalize;
pub mod retry;
pub mod roboflow;
pub mod runner;

pub use backend::{DetectionBackend, DetectorFactory};
pub use detector::{DetectOptions, Detector};
pub use normalize::{canonical_name, parse_ingredient_text};
pub use runner::{DetectionRunner, RunOptions};
