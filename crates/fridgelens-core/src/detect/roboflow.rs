//! Roboflow hosted object-detection backend.
//!
//! Posts the base64 image to `{endpoint}/{model_id}` and projects the
//! returned `predictions` array (center-based boxes, class labels).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::backend::{BackendOutput, BackendRequest, DetectionBackend};
use super::network;
use super::normalize::{project_predictions, RawPrediction};
use crate::error::DetectError;

const NAME: &str = "roboflow";

/// Roboflow detection backend.
pub struct RoboflowBackend {
    endpoint: String,
    model_id: String,
    api_key: String,
    /// Minimum confidence in percent (0-100), applied server-side
    confidence: u32,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl RoboflowBackend {
    pub fn new(endpoint: &str, model_id: &str, api_key: &str, confidence: u32, timeout_ms: u64) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model_id: model_id.trim_matches('/').to_string(),
            api_key: api_key.to_string(),
            confidence,
            timeout_ms,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model_id)
    }
}

#[derive(Deserialize)]
struct InferResponse {
    predictions: Vec<RawPrediction>,
}

#[async_trait]
impl DetectionBackend for RoboflowBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn host(&self) -> Option<String> {
        network::host_of(&self.endpoint)
    }

    async fn detect(&self, request: &BackendRequest) -> Result<BackendOutput, DetectError> {
        let api_key = request.api_key.as_deref().unwrap_or(&self.api_key);
        let confidence = self.confidence.to_string();

        let resp = self
            .client
            .post(self.url())
            .query(&[("api_key", api_key), ("confidence", confidence.as_str())])
            .header("content-type", "application/x-www-form-urlencoded")
            .body(request.image.data.clone())
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| DetectError::from_transport(NAME, e, self.timeout_ms))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DetectError::from_transport(NAME, e, self.timeout_ms))?;
        if !status.is_success() {
            return Err(DetectError::from_status(NAME, status.as_u16(), body));
        }

        let parsed: InferResponse =
            serde_json::from_str(&body).map_err(|e| DetectError::ResponseParse {
                backend: NAME.to_string(),
                message: e.to_string(),
                raw: Some(body.clone()),
            })?;

        tracing::debug!(
            model = %self.model_id,
            count = parsed.predictions.len(),
            "Roboflow returned predictions"
        );

        Ok(BackendOutput {
            predictions: project_predictions(parsed.predictions),
            raw: body,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
