//! Image handling stages around detection.
//!
//! - **validate**: Existence, size and magic-byte checks
//! - **decode**: Load and decode images with format detection
//! - **discovery**: Find image files in directories
//! - **annotate**: Draw prediction boxes onto copies of images
//! - **samples**: Render synthetic fridge photos

pub mod annotate;
pub mod decode;
pub mod discovery;
pub mod samples;
pub mod validate;

// Re-exports for convenient access
pub use annotate::Annotator;
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use samples::SampleGenerator;
pub use validate::Validator;
