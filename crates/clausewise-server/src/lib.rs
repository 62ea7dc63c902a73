//! Clausewise Server
//!
//! HTTP backend for the Clausewise browser extension: Terms and Conditions
//! analysis, follow-up chat, and dark pattern detection on screenshots.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod validation;

use clausewise_analyzer::Analyzer;
use clausewise_llm::GeminiProvider;
use clausewise_store::{InMemoryAnalysisCache, InMemoryTrustStore};
use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the shared state: Gemini provider, in-memory cache and trust store
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    config.validate()?;

    let provider = GeminiProvider::new(config.llm.api_key.clone(), config.llm.model.clone())
        .with_endpoint(config.llm.endpoint.clone());
    if !provider.is_configured() {
        // Checked again on every model call; the server still starts
        warn!("GEMINI_API_KEY is not set; analysis requests will fail");
    }

    let cache = InMemoryAnalysisCache::with_ttl(config.analyzer.cache_ttl());
    let trust = InMemoryTrustStore::new();

    let analyzer = Analyzer::new(
        Arc::new(provider),
        Arc::new(cache),
        Arc::new(trust),
        config.analyzer.clone(),
    );

    Ok(AppState {
        analyzer: Arc::new(analyzer),
    })
}

/// Start the HTTP server
///
/// Builds the application state from `config` and serves until the process
/// is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Clausewise server");
    info!("Bind address: {}", config.bind_addr());
    info!("Model: {}", config.llm.model);
    info!(
        "Max text length: {} chars, cache TTL: {} seconds",
        config.analyzer.max_text_length, config.analyzer.cache_ttl_secs
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_without_api_key() {
        let config = ServerConfig::default();
        assert!(build_state(&config).is_ok());
    }

    #[test]
    fn test_build_state_rejects_invalid_config() {
        let mut config = ServerConfig::default();
        config.analyzer.max_text_length = 0;
        assert!(matches!(build_state(&config), Err(ServerError::Config(_))));
    }
}
