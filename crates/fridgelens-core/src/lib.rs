//! Fridgelens Core - ingredient detection for fridge photos.
//!
//! Sends an image to a remote vision model (Roboflow object detection or
//! Gemini), normalizes whatever comes back into a list of ingredient names,
//! and aggregates names across images.
//!
//! # Architecture
//!
//! ```text
//! Image → Validate → Decode → Backend → Normalize → DetectionResult → Aggregate
//! ```
//!
//! A failure on one image never aborts a batch: it becomes a degraded
//! [`DetectionResult`] with an error tag and no predictions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fridgelens_core::{Config, DetectionRequest, Detector, ImageRef};
//!
//! #[tokio::main]
//! async fn main() -> fridgelens_core::Result<()> {
//!     let config = Config::load()?;
//!     let detector = Detector::from_config(&config, "gemini", None, None)?;
//!
//!     let request = DetectionRequest::new(ImageRef::path("./fridge.jpg"));
//!     let result = detector.detect(&request).await;
//!     println!("Ingredients: {:?}", result.ingredients());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod aggregate;
pub mod config;
pub mod detect;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod types;

// Re-exports for convenient access
pub use aggregate::{aggregate, Aggregator};
pub use config::Config;
pub use detect::{DetectOptions, DetectionRunner, Detector, DetectorFactory, RunOptions};
pub use error::{ConfigError, DetectError, DetectResult, ErrorKind, FridgeError, Result};
pub use output::{OutputFormat, ResultWriter};
pub use types::{
    AggregatedIngredients, BoundingBox, DetectionRequest, DetectionResult, ImageRef, Prediction,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
