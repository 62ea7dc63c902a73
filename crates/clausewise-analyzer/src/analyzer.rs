//! Core Analyzer implementation

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::image::ImagePayload;
use crate::parser::{parse_analysis, parse_dark_patterns};
use crate::prompt::{build_chat_request, build_vision_request, PromptBuilder};
use crate::types::{AnalysisOutcome, AnalysisRequest, ChatRequest, TrustReport};
use clausewise_domain::{AnalysisResult, DarkPatternReport, RiskLevel};
use clausewise_llm::{GenerationRequest, LlmProvider};
use clausewise_store::{AnalysisCache, CacheStats, TrustScoreStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The Analyzer turns documents and screenshots into validated results
///
/// Only the analyze path touches the cache and trust scores. Concurrent misses
/// for the same key each call the model; nothing coalesces them.
pub struct Analyzer {
    provider: Arc<dyn LlmProvider>,
    cache: Arc<dyn AnalysisCache>,
    trust: Arc<dyn TrustScoreStore>,
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create a new Analyzer
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        cache: Arc<dyn AnalysisCache>,
        trust: Arc<dyn TrustScoreStore>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            trust,
            config,
        }
    }

    /// Analyze a document, consulting the cache first
    ///
    /// On a miss the fresh result is cached and, when a URL was given, the
    /// site's trust score is adjusted. A hit never touches the trust score.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisOutcome, AnalyzerError> {
        if request.text.is_empty() {
            return Err(AnalyzerError::InvalidInput("text must not be empty".to_string()));
        }

        if let Some(cached) = self.cache.get(&request.text, request.persona).await? {
            info!("Serving cached analysis for persona '{}'", request.persona);
            let result = self.attach_trust(cached, request.url.as_deref()).await?;
            return Ok(AnalysisOutcome {
                result,
                from_cache: true,
            });
        }

        info!(
            "Starting analysis for persona '{}', text length {}",
            request.persona,
            request.text.len()
        );

        let prompt = PromptBuilder::new(&request.text, request.persona, self.config.max_text_length).build();
        let raw = self.call_llm(&prompt).await?;
        let result = parse_analysis(&raw, request.persona.response_shape(), &request.text)
            .inspect_err(|e| log_rejected_output(e, &raw))?;

        info!(
            "Analysis complete: overall risk {}, {} notable clauses ({} high risk)",
            result.overall_risk,
            result.notable_clauses.len(),
            result.clauses_at(RiskLevel::High)
        );

        self.cache
            .put(&request.text, request.persona, result.clone())
            .await?;

        if let Some(url) = request.url.as_deref() {
            let score = self.trust.update(url, result.overall_risk).await?;
            info!("Trust score for {} is now {}", url, score.value());
        }

        let result = self.attach_trust(result, request.url.as_deref()).await?;
        Ok(AnalysisOutcome {
            result,
            from_cache: false,
        })
    }

    /// Answer a question about a document
    pub async fn chat(&self, request: ChatRequest) -> Result<String, AnalyzerError> {
        if request.message.is_empty() {
            return Err(AnalyzerError::InvalidInput("message must not be empty".to_string()));
        }

        debug!("Chat with {} prior turns", request.history.len());
        let prompt = build_chat_request(
            &request.text,
            &request.history,
            &request.message,
            self.config.max_text_length,
        );
        let response = self.call_llm(&prompt).await?;
        Ok(response.trim().to_string())
    }

    /// Inspect a screenshot for dark patterns
    pub async fn detect_dark_patterns(
        &self,
        image: &ImagePayload,
    ) -> Result<DarkPatternReport, AnalyzerError> {
        info!("Inspecting {} screenshot ({} base64 chars)", image.mime_type, image.data.len());

        let prompt = build_vision_request(image);
        let raw = self.call_llm(&prompt).await?;
        let report = parse_dark_patterns(&raw).inspect_err(|e| log_rejected_output(e, &raw))?;

        info!(
            "Dark pattern inspection complete: {} findings",
            report.details.len()
        );
        Ok(report)
    }

    /// Current trust standing of a site
    pub async fn trust_report(&self, url: &str) -> Result<TrustReport, AnalyzerError> {
        let score = self.trust.score(url).await?;
        let band = self.trust.band_label(url).await?;
        Ok(TrustReport {
            url: url.to_string(),
            score,
            band,
        })
    }

    /// Cache counters
    pub async fn cache_stats(&self) -> Result<CacheStats, AnalyzerError> {
        Ok(self.cache.stats().await?)
    }

    async fn attach_trust(
        &self,
        result: AnalysisResult,
        url: Option<&str>,
    ) -> Result<AnalysisResult, AnalyzerError> {
        match url {
            Some(url) => {
                let label = self.trust.band_label(url).await?;
                Ok(result.with_trust_score(label))
            }
            None => Ok(result),
        }
    }

    async fn call_llm(&self, prompt: &GenerationRequest) -> Result<String, AnalyzerError> {
        let start = Instant::now();
        debug!("Prompt length: {} chars", prompt.text_len());

        let response = self.provider.generate(prompt).await.inspect_err(|e| {
            warn!("Call to {} failed: {}", self.provider.model_name(), e);
        })?;

        debug!(
            "LLM response length: {} chars in {} ms",
            response.len(),
            start.elapsed().as_millis()
        );
        Ok(response)
    }
}

fn log_rejected_output(error: &AnalyzerError, raw: &str) {
    warn!("Model output rejected: {}", error);
    warn!("Raw response: {}", raw);
}
