//! Gemini generative-model backend.
//!
//! Sends the image with a fixed instruction asking for a fenced
//! `{"ingredients": [...]}` block via the `generateContent` REST API, then
//! normalizes the free-text reply.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::backend::{BackendOutput, BackendRequest, DetectionBackend};
use super::network;
use super::normalize::parse_ingredient_text;
use crate::error::DetectError;
use crate::types::Prediction;

const NAME: &str = "gemini";

/// Instruction sent with every image. Asks for plain ingredient names
/// (no brands) as a single JSON object and shows the expected shape.
pub const PROMPT_TEXT: &str = r#"この画像は冷蔵庫の中身です。写っている食材を特定し、一般的な食材名のリストをJSON形式で返してください。
商品名やブランド名は含めず、例えば「卵」「牛乳」「納豆」「キャベツ」のように、基本的な食材名でお願いします。
他の説明テキストは含めず、JSONオブジェクトのみを返してください。

出力形式の例:
```json
{
  "ingredients": [
    "卵",
    "牛乳",
    "納豆",
    "キャベツ",
    "トマト"
  ]
}
```
"#;

/// Gemini detection backend.
pub struct GeminiBackend {
    endpoint: String,
    model: String,
    api_key: String,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout_ms: u64) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout_ms,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiBackend {
    fn parse_error(message: impl Into<String>, raw: &str) -> DetectError {
        DetectError::ResponseParse {
            backend: NAME.to_string(),
            message: message.into(),
            raw: Some(raw.to_string()),
        }
    }

    /// Concatenate the text parts of the first candidate.
    fn response_text(body: &str) -> Result<String, DetectError> {
        let parsed: GenerateResponse =
            serde_json::from_str(body).map_err(|e| Self::parse_error(e.to_string(), body))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Self::parse_error("response contained no text", body));
        }
        Ok(text)
    }
}

#[async_trait]
impl DetectionBackend for GeminiBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn host(&self) -> Option<String> {
        network::host_of(&self.endpoint)
    }

    async fn detect(&self, request: &BackendRequest) -> Result<BackendOutput, DetectError> {
        let api_key = request.api_key.as_deref().unwrap_or(&self.api_key);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: PROMPT_TEXT.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.media_type.clone(),
                            data: request.image.data.clone(),
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| DetectError::from_transport(NAME, e, self.timeout_ms))?;

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| DetectError::from_transport(NAME, e, self.timeout_ms))?;
        if !status.is_success() {
            return Err(DetectError::from_status(NAME, status.as_u16(), raw));
        }

        let text = Self::response_text(&raw)?;
        let ingredients =
            parse_ingredient_text(&text).map_err(|e| Self::parse_error(e.to_string(), &text))?;

        tracing::debug!(model = %self.model, count = ingredients.len(), "Gemini returned ingredients");

        Ok(BackendOutput {
            predictions: ingredients.into_iter().map(Prediction::label).collect(),
            raw: text,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::backend::ImageInput;
    use crate::error::ErrorKind;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    fn request() -> BackendRequest {
        BackendRequest {
            image: ImageInput::from_bytes(&[0x89, b'P', b'N', b'G'], "image/png"),
            api_key: None,
        }
    }

    const ROUTE: &str = "/v1beta/models/{call}";

    #[tokio::test]
    async fn test_detect_parses_fenced_reply() {
        let app = Router::new().route(
            ROUTE,
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers.get("x-goog-api-key").unwrap(), "secret");
                let parts = &body["contents"][0]["parts"];
                assert!(parts[0]["text"].as_str().unwrap().contains("ingredients"));
                assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
                Json(reply("```json\n{\"ingredients\": [\"卵\", \"牛乳\"]}\n```"))
            }),
        );
        let base = spawn(app).await;
        let backend = GeminiBackend::new(&base, "gemini-1.5-flash", "secret", 5_000);

        let out = backend.detect(&request()).await.unwrap();
        let labels: Vec<_> = out.predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["卵", "牛乳"]);
        assert!(out.predictions[0].bbox.is_none());
        assert!(out.raw.starts_with("```json"));
    }

    #[tokio::test]
    async fn test_empty_ingredient_list() {
        let app = Router::new().route(
            ROUTE,
            post(|| async { Json(reply("{\"ingredients\": []}")) }),
        );
        let base = spawn(app).await;
        let backend = GeminiBackend::new(&base, "gemini-1.5-flash", "k", 5_000);

        assert!(backend.detect(&request()).await.unwrap().predictions.is_empty());
    }

    #[tokio::test]
    async fn test_prose_reply_is_parse_error_with_raw() {
        let app = Router::new().route(
            ROUTE,
            post(|| async { Json(reply("I can see some eggs.")) }),
        );
        let base = spawn(app).await;
        let backend = GeminiBackend::new(&base, "gemini-1.5-flash", "k", 5_000);

        let err = backend.detect(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseParseError);
        assert_eq!(err.raw(), Some("I can see some eggs."));
    }

    #[tokio::test]
    async fn test_no_candidates_is_parse_error() {
        let app = Router::new().route(
            ROUTE,
            post(|| async { Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})) }),
        );
        let base = spawn(app).await;
        let backend = GeminiBackend::new(&base, "gemini-1.5-flash", "k", 5_000);

        let err = backend.detect(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResponseParseError);
    }

    #[tokio::test]
    async fn test_forbidden_is_auth_error() {
        let app = Router::new().route(
            ROUTE,
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let base = spawn(app).await;
        let backend = GeminiBackend::new(&base, "gemini-1.5-flash", "bad", 5_000);

        let err = backend.detect(&request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationError);
    }

    #[test]
    fn test_url() {
        let backend = GeminiBackend::new(
            "https://generativelanguage.googleapis.com/",
            "gemini-1.5-flash",
            "k",
            1,
        );
        assert_eq!(
            backend.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_multi_part_text_is_joined() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"ingredients\": "}, {"text": "[\"卵\"]}"}]}}]}"#;
        let text = GeminiBackend::response_text(body).unwrap();
        assert_eq!(text, "{\"ingredients\": [\"卵\"]}");
    }
}
