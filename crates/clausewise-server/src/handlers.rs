//! HTTP request handlers for the analysis service.
//!
//! Implements the analyze, chat, dark pattern, trust score and health check
//! endpoints using axum.

use crate::validation::{AnalyzeBody, ChatBody, DarkPatternBody, FieldError};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use clausewise_analyzer::{AnalysisOutcome, Analyzer, AnalyzerError, TrustReport};
use clausewise_domain::DarkPatternReport;
use clausewise_store::CacheStats;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, Span};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Analysis service shared by every handler
    pub analyzer: Arc<Analyzer>,
}

/// Chat answer
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Model's answer text
    pub response: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Result cache counters
    pub cache: CacheStats,
}

/// Query string of `GET /trust-score`
#[derive(Debug, Deserialize)]
pub struct TrustScoreQuery {
    /// Site URL to look up
    pub url: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category
    pub error: String,
    /// Per-field problems, present for validation errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The request was rejected before any work was done
    Validation(Vec<FieldError>),
    /// Analysis failed
    Analyzer(AnalyzerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(details) => {
                let body = Json(ErrorResponse {
                    error: "Validation Error".to_string(),
                    details,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::Analyzer(AnalyzerError::InvalidInput(message)) => {
                AppError::Validation(vec![FieldError::new("body", message)]).into_response()
            }
            AppError::Analyzer(e) => {
                error!("Request failed: {}", e);
                let body = Json(ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    details: Vec::new(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<AnalyzerError> for AppError {
    fn from(e: AnalyzerError) -> Self {
        AppError::Analyzer(e)
    }
}

impl From<Vec<FieldError>> for AppError {
    fn from(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

/// POST /analyze - Analyze Terms and Conditions text
async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    let Json(body) = body?;
    let request = body.validate()?;
    let outcome = state.analyzer.analyze(request).await?;
    Ok(Json(outcome))
}

/// POST /chat - Answer a question about a document
async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(body) = body?;
    let request = body.validate()?;
    let response = state.analyzer.chat(request).await?;
    Ok(Json(ChatResponse { response }))
}

/// POST /detect-dark-patterns - Inspect a screenshot
async fn detect_dark_patterns(
    State(state): State<AppState>,
    body: Result<Json<DarkPatternBody>, JsonRejection>,
) -> Result<Json<DarkPatternReport>, AppError> {
    let Json(body) = body?;
    let image = body.validate()?;
    let report = state.analyzer.detect_dark_patterns(&image).await?;
    Ok(Json(report))
}

/// GET /trust-score?url= - Current trust standing of a site
async fn trust_score(
    State(state): State<AppState>,
    Query(query): Query<TrustScoreQuery>,
) -> Result<Json<TrustReport>, AppError> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| vec![FieldError::new("url", "url is required")])?;
    let report = state.analyzer.trust_report(&url).await?;
    Ok(Json(report))
}

/// GET /health - Liveness and cache counters
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthCheckResponse>, AppError> {
    let cache = state.analyzer.cache_stats().await?;
    Ok(Json(HealthCheckResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache,
    }))
}

fn request_span(request: &Request<Body>) -> Span {
    info_span!(
        "request",
        request_id = %Uuid::now_v7(),
        method = %request.method(),
        uri = %request.uri()
    )
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/analyze", post(analyze))
        .route("/chat", post(chat))
        .route("/detect-dark-patterns", post(detect_dark_patterns))
        .route("/trust-score", get(trust_score))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
