//! HTTP analysis endpoint.
//!
//! - `POST /analyze`: multipart upload, field `file`
//! - `GET /health`: liveness and current mode
//!
//! In stub mode the upload is ignored and a fixed list is returned as long
//! as the configured sample file exists. In detect mode the upload is run
//! through the detector.

mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use handlers::{AnalyzeResponse, HealthResponse, STUB_INGREDIENTS};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info_span;

use crate::config::{ServerConfig, ServerMode};
use crate::detect::Detector;
use crate::error::{ConfigError, FridgeError};

/// Build the router for the given state.
pub fn router(state: AppState) -> Router {
    let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
        |request: &axum::extract::Request| {
            let uri = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        },
    );

    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(trace_layer)
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, detector: Option<Arc<Detector>>) -> Result<(), FridgeError> {
    if config.mode == ServerMode::Detect && detector.is_none() {
        return Err(ConfigError::ValidationError(
            "detect mode requires a detector".to_string(),
        )
        .into());
    }

    let state = AppState::new(config, detector);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(
        mode = config.mode.as_str(),
        "Listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use crate::detect::backend::BackendOutput;
    use crate::detect::detector::tests::{png_bytes, MockBackend};
    use crate::detect::DetectOptions;
    use crate::error::DetectError;
    use crate::types::Prediction;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::path::Path;

    fn stub_state(sample: &Path) -> AppState {
        let config = ServerConfig {
            sample_image: sample.to_path_buf(),
            ..ServerConfig::default()
        };
        AppState::new(&config, None)
    }

    fn detect_state(backend: MockBackend) -> AppState {
        let config = ServerConfig {
            mode: ServerMode::Detect,
            ..ServerConfig::default()
        };
        let detector = Detector::new(Box::new(backend), LimitsConfig::default(), DetectOptions::default());
        AppState::new(&config, Some(Arc::new(detector)))
    }

    fn upload(bytes: Vec<u8>) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes).file_name("fridge.png").mime_type("image/png"),
        )
    }

    #[tokio::test]
    async fn test_stub_missing_sample_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(router(stub_state(&dir.path().join("analyze_image_test")))).unwrap();

        let response = server.post("/analyze").multipart(upload(vec![1, 2, 3])).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "File not found: analyze_image_test");
    }

    #[tokio::test]
    async fn test_stub_returns_fixed_list_regardless_of_upload() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("analyze_image_test");
        std::fs::write(&sample, b"anything").unwrap();
        let server = TestServer::new(router(stub_state(&sample))).unwrap();

        let response = server.post("/analyze").multipart(upload(b"not an image".to_vec())).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body, serde_json::json!({"ingredients": ["たまご", "牛乳", "トマト"]}));
    }

    #[tokio::test]
    async fn test_missing_file_field_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(router(stub_state(dir.path()))).unwrap();

        let form = MultipartForm::new().add_text("note", "no file here");
        let response = server.post("/analyze").multipart(form).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("file"));
    }

    #[tokio::test]
    async fn test_detect_mode_dedupes_in_order() {
        let backend = MockBackend::labels(&["牛乳", "卵", "牛乳"]);
        let server = TestServer::new(router(detect_state(backend))).unwrap();

        let response = server.post("/analyze").multipart(upload(png_bytes(8, 8))).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body, serde_json::json!({"ingredients": ["牛乳", "卵"]}));
    }

    #[tokio::test]
    async fn test_detect_mode_undecodable_upload_is_422() {
        let backend = MockBackend::labels(&["卵"]);
        let calls = backend.call_count_handle();
        let server = TestServer::new(router(detect_state(backend))).unwrap();

        let response = server.post("/analyze").multipart(upload(b"plain text".to_vec())).await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "image_decode_error");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_detect_mode_parse_error_is_502() {
        let backend = MockBackend::with_fn(|_| {
            Err(DetectError::ResponseParse {
                backend: "mock".into(),
                message: "expected value".into(),
                raw: None,
            })
        });
        let server = TestServer::new(router(detect_state(backend))).unwrap();

        let response = server.post("/analyze").multipart(upload(png_bytes(8, 8))).await;
        assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(body["error"], "response_parse_error");
    }

    #[tokio::test]
    async fn test_detect_mode_empty_result_is_ok() {
        let backend = MockBackend::with_fn(|_| {
            Ok(BackendOutput {
                predictions: Vec::<Prediction>::new(),
                raw: "{\"ingredients\": []}".into(),
            })
        });
        let server = TestServer::new(router(detect_state(backend))).unwrap();

        let response = server.post("/analyze").multipart(upload(png_bytes(8, 8))).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["ingredients"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_health_reports_mode() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(router(stub_state(dir.path()))).unwrap();

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body, serde_json::json!({"status": "ok", "mode": "stub"}));
    }

    #[tokio::test]
    async fn test_serve_rejects_detect_mode_without_detector() {
        let config = ServerConfig {
            mode: ServerMode::Detect,
            ..ServerConfig::default()
        };
        let err = serve(&config, None).await.unwrap_err();
        assert!(err.to_string().contains("detect mode requires a detector"));
    }
}
