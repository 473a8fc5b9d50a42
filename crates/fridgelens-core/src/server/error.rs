use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::ErrorKind;

/// Error responses of the analysis endpoint. Every body has an `error` key.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (e.g. missing `file` field)
    BadRequest(String),
    /// Upload exceeds the body limit
    PayloadTooLarge(String),
    /// Stub sample file is missing
    NotFound(String),
    /// Detection failed for the uploaded image
    Detection { kind: ErrorKind, message: String },
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Detection { kind, .. } => match kind {
                ErrorKind::ImageNotFound | ErrorKind::ImageDecodeError => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorKind::AuthenticationError | ErrorKind::ResponseParseError => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorKind::ServiceUnavailable | ErrorKind::NetworkUnreachable => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message)
            | ApiError::PayloadTooLarge(message)
            | ApiError::NotFound(message)
            | ApiError::Internal(message) => json!({ "error": message }),
            ApiError::Detection { kind, message } => {
                json!({ "error": kind.as_str(), "message": message })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(kind: ErrorKind) -> ApiError {
        ApiError::Detection {
            kind,
            message: String::new(),
        }
    }

    #[test]
    fn test_detection_status_codes() {
        assert_eq!(detection(ErrorKind::ImageDecodeError).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detection(ErrorKind::ResponseParseError).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(detection(ErrorKind::AuthenticationError).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(detection(ErrorKind::NetworkUnreachable).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(detection(ErrorKind::Timeout).status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
