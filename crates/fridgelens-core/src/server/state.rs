use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{expand_path, ServerConfig, ServerMode};
use crate::detect::Detector;

/// Shared state for the analysis endpoint.
#[derive(Clone)]
pub struct AppState {
    pub mode: ServerMode,
    /// File the stub answers from
    pub sample_image: PathBuf,
    /// Required in detect mode
    pub detector: Option<Arc<Detector>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig, detector: Option<Arc<Detector>>) -> Self {
        Self {
            mode: config.mode,
            sample_image: expand_path(&config.sample_image),
            detector,
            max_upload_bytes: config.max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}
