//! Clausewise LLM Provider Layer
//!
//! Pluggable language model providers behind one async trait.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` REST API
//!
//! Providers make exactly one attempt per call. Retrying, if wanted, is the
//! caller's decision.
//!
//! # Examples
//!
//! ```
//! use clausewise_llm::{GenerationRequest, LlmProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate(&GenerationRequest::text("test prompt")).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;
pub mod request;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use request::{GenerationRequest, Part, ResponseFormat, Turn, TurnRole};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider is not configured (e.g. no API key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Provider answered but produced no text
    #[error("Empty response from model")]
    EmptyResponse,

    /// Provider envelope could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

/// A language model backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one generation and return the model's raw text
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Name of the model behind this provider, for logging
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(LlmError),
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Scripted replies are matched by substring against the request's text, in
/// the order they were added; unmatched requests get the default response.
///
/// # Examples
///
/// ```
/// use clausewise_llm::{GenerationRequest, LlmProvider, MockProvider};
///
/// # async fn example() {
/// let mut provider = MockProvider::default();
/// provider.add_response("chat", "response1");
/// provider.add_response("analyze", "response2");
/// assert_eq!(provider.generate(&GenerationRequest::text("please chat")).await.unwrap(), "response1");
/// assert_eq!(provider.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all requests
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` to any request whose text contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.lock_responses()
            .push((needle.into(), MockReply::Text(response.into())));
    }

    /// Fail with `error` for any request whose text contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>, error: LlmError) {
        self.lock_responses()
            .push((needle.into(), MockReply::Error(error)));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.lock_requests().clone()
    }

    /// Reset the call history
    pub fn reset_call_count(&self) {
        self.lock_requests().clear();
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, Vec<(String, MockReply)>> {
        self.responses.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<GenerationRequest>> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.lock_requests().push(request.clone());

        let text = request.flattened_text();
        let scripted = self
            .lock_responses()
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        match scripted {
            Some(MockReply::Text(response)) => Ok(response),
            Some(MockReply::Error(error)) => Err(error),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
