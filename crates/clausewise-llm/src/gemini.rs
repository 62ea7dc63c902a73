//! Gemini Provider Implementation
//!
//! Talks to Google's `generateContent` REST endpoint.
//!
//! # Features
//!
//! - Multi-turn conversations with inline image parts
//! - JSON response mode via `generationConfig.responseMimeType`
//! - API key checked on first call rather than at construction
//!
//! # Examples
//!
//! ```no_run
//! use clausewise_llm::GeminiProvider;
//!
//! let provider = GeminiProvider::new(Some("my-api-key".to_string()), "gemini-2.5-flash");
//! ```

use crate::request::{GenerationRequest, Part};
use crate::{LlmError, LlmProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<WireContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: WireBlob<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            if let Some(reason) = &candidate.finish_reason {
                debug!("Gemini returned no text (finish reason {})", reason);
            }
            None
        } else {
            Some(text)
        }
    }
}

fn to_wire(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    let contents = request
        .turns
        .iter()
        .map(|turn| WireContent {
            role: turn.role.as_str(),
            parts: turn
                .parts
                .iter()
                .map(|part| match part {
                    Part::Text(text) => WirePart::Text { text: text.as_str() },
                    Part::InlineData { mime_type, data } => WirePart::Inline {
                        inline_data: WireBlob {
                            mime_type: mime_type.as_str(),
                            data: data.as_str(),
                        },
                    },
                })
                .collect(),
        })
        .collect();

    GenerateContentRequest {
        contents,
        generation_config: GenerationConfig {
            response_mime_type: request.response_format.mime_type(),
        },
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider against the public endpoint
    ///
    /// A missing API key is not an error here; calls fail with
    /// [`LlmError::Configuration`] until one is supplied.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a different base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Configuration("GEMINI_API_KEY is not defined".to_string()))?;

        debug!(
            "Calling {} with {} turns, {} chars of text",
            self.model,
            request.turns.len(),
            request.text_len()
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&to_wire(request))
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Gemini returned HTTP {}: {}", status, error_text);
            return Err(LlmError::Communication(format!("HTTP {}", status)));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        body.text().ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ResponseFormat, Turn, TurnRole};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn_stub(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/:model",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new(Some("key".into()), "gemini-2.5-flash");
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "gemini-2.5-flash");
        assert!(provider.is_configured());
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let provider = GeminiProvider::new(Some("  ".into()), DEFAULT_MODEL);
        assert!(!provider.is_configured());
    }

    #[test]
    fn test_wire_format() {
        let request = GenerationRequest {
            turns: vec![
                Turn::user("describe"),
                Turn {
                    role: TurnRole::Model,
                    parts: vec![Part::InlineData {
                        mime_type: "image/png".into(),
                        data: "AAAA".into(),
                    }],
                },
            ],
            response_format: ResponseFormat::Json,
        };

        let wire = serde_json::to_value(to_wire(&request)).unwrap();
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(wire["contents"][1]["role"], "model");
        assert_eq!(wire["contents"][1]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(wire["contents"][1]["parts"][0]["inlineData"]["data"], "AAAA");
        assert_eq!(wire["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"a\":1}"));

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let provider = GeminiProvider::new(None, DEFAULT_MODEL);
        let result = provider.generate(&GenerationRequest::text("hi")).await;
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let provider = GeminiProvider::new(Some("key".into()), DEFAULT_MODEL)
            .with_endpoint("http://127.0.0.1:1");
        let result = provider.generate(&GenerationRequest::text("hi")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_generate_against_stub() {
        let endpoint = spawn_stub(
            StatusCode::OK,
            json!({ "candidates": [{ "content": { "parts": [{ "text": "hello" }] } }] }),
        )
        .await;
        let provider = GeminiProvider::new(Some("key".into()), DEFAULT_MODEL).with_endpoint(endpoint);

        let text = provider.generate(&GenerationRequest::text("hi")).await.unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_response() {
        let endpoint = spawn_stub(StatusCode::OK, json!({ "candidates": [] })).await;
        let provider = GeminiProvider::new(Some("key".into()), DEFAULT_MODEL).with_endpoint(endpoint);

        let result = provider.generate(&GenerationRequest::text("hi")).await;
        assert_eq!(result.unwrap_err(), LlmError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_server_error_is_communication_error() {
        let endpoint = spawn_stub(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "message": "internal provider detail" } }),
        )
        .await;
        let provider = GeminiProvider::new(Some("key".into()), DEFAULT_MODEL).with_endpoint(endpoint);

        match provider.generate(&GenerationRequest::text("hi")).await {
            Err(LlmError::Communication(msg)) => assert!(!msg.contains("internal provider detail")),
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let endpoint = spawn_stub(StatusCode::TOO_MANY_REQUESTS, json!({})).await;
        let provider = GeminiProvider::new(Some("key".into()), DEFAULT_MODEL).with_endpoint(endpoint);

        let result = provider.generate(&GenerationRequest::text("hi")).await;
        assert_eq!(result.unwrap_err(), LlmError::RateLimitExceeded);
    }
}
