//! Batch detection over a list of image files.
//!
//! Images are processed one at a time unless `parallel > 1`, in which case
//! up to `parallel` backend calls run at once (bounded by a semaphore).
//! Either way, results reach the callback in input order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::detector::Detector;
use crate::aggregate::Aggregator;
use crate::error::{DetectError, ErrorKind};
use crate::types::{AggregatedIngredients, DetectionRequest, DetectionResult, ImageRef};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum concurrent detections
    pub parallel: usize,
    /// Resolve the backend host once before the first image
    pub dns_precheck: bool,
    /// Credential override applied to every request
    pub api_key: Option<String>,
    /// Fold ingredient synonyms during aggregation
    pub canonicalize: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: 1,
            dns_precheck: true,
            api_key: None,
            canonicalize: false,
        }
    }
}

/// Runs a detector over many files and aggregates the outcome.
pub struct DetectionRunner {
    detector: Arc<Detector>,
    options: RunOptions,
}

impl DetectionRunner {
    pub fn new(detector: Arc<Detector>, options: RunOptions) -> Self {
        Self { detector, options }
    }

    fn request(&self, path: &Path) -> DetectionRequest {
        let request = DetectionRequest::new(ImageRef::path(path));
        match &self.options.api_key {
            Some(key) => request.with_api_key(key.clone()),
            None => request,
        }
    }

    /// Detect every file, calling `on_result` for each in input order.
    ///
    /// Only a failed network pre-check aborts the run; per-image failures
    /// are reported as degraded results and counted.
    pub async fn run<F>(&self, files: &[PathBuf], mut on_result: F) -> Result<AggregatedIngredients, DetectError>
    where
        F: FnMut(&Path, &DetectionResult),
    {
        if self.options.dns_precheck && !files.is_empty() {
            self.detector.check_network().await?;
        }

        let mut aggregator = Aggregator::new(self.options.canonicalize);

        if self.options.parallel <= 1 {
            for path in files {
                let result = self.detector.detect(&self.request(path)).await;
                on_result(path, &result);
                aggregator.add(&result);
            }
            return Ok(aggregator.finish());
        }

        let semaphore = Arc::new(Semaphore::new(self.options.parallel));
        let mut handles = Vec::with_capacity(files.len());
        for path in files {
            let semaphore = semaphore.clone();
            let detector = self.detector.clone();
            let request = self.request(path);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                detector.detect(&request).await
            }));
        }

        for (path, handle) in files.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Detection task for {} panicked: {e}", path.display());
                    DetectionResult::degraded(
                        path.display().to_string(),
                        self.detector.backend_name(),
                        ErrorKind::ServiceUnavailable,
                        format!("detection task failed: {e}"),
                        None,
                    )
                }
            };
            on_result(path, &result);
            aggregator.add(&result);
        }

        Ok(aggregator.finish())
    }
}
