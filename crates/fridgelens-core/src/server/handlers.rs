use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use super::error::ApiError;
use super::state::AppState;
use crate::config::ServerMode;
use crate::types::{DetectionRequest, ImageRef};

/// Fixed answer of the stub endpoint.
pub const STUB_INGREDIENTS: [&str; 3] = ["たまご", "牛乳", "トマト"];

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: &'static str,
}

struct Upload {
    name: String,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload {
            name,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest(
        "Missing 'file' field in multipart form".to_string(),
    ))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

/// `POST /analyze`
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let upload = read_upload(multipart).await?;

    match state.mode {
        ServerMode::Stub => stub_answer(&state).await,
        ServerMode::Detect => detect_answer(&state, upload).await,
    }
}

async fn stub_answer(state: &AppState) -> Result<Json<AnalyzeResponse>, ApiError> {
    let sample = &state.sample_image;
    if !sample.exists() {
        let name = sample
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| sample.display().to_string());
        warn!("Stub sample missing: {}", sample.display());
        return Err(ApiError::NotFound(format!("File not found: {name}")));
    }

    // Read to prove the sample is accessible; its content is not analyzed.
    let bytes = tokio::fs::read(sample)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read {}: {e}", sample.display())))?;
    info!(bytes = bytes.len(), "Stub analyze");

    Ok(Json(AnalyzeResponse {
        ingredients: STUB_INGREDIENTS.iter().map(|s| s.to_string()).collect(),
    }))
}

async fn detect_answer(state: &AppState, upload: Upload) -> Result<Json<AnalyzeResponse>, ApiError> {
    let detector = state
        .detector
        .as_ref()
        .ok_or_else(|| ApiError::Internal("detector not configured".to_string()))?;

    let request = DetectionRequest::new(ImageRef::bytes(upload.name, upload.bytes));
    let result = detector.detect(&request).await;

    if let Some(kind) = result.error {
        return Err(ApiError::Detection {
            kind,
            message: result.error_message.unwrap_or_default(),
        });
    }

    let mut ingredients: Vec<String> = Vec::with_capacity(result.predictions.len());
    for label in result.ingredients() {
        if !ingredients.iter().any(|seen| seen == label) {
            ingredients.push(label.to_string());
        }
    }
    info!(image = %result.image, count = ingredients.len(), "Analyze complete");

    Ok(Json(AnalyzeResponse { ingredients }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: state.mode.as_str(),
    })
}
