//! Clausewise Analyzer
//!
//! Turns page text and screenshots into validated, structured results using an
//! LLM.
//!
//! # Architecture
//!
//! ```text
//! Text ─┬─ Cache hit ───────────────────────────────→ Result (from_cache)
//!       └─ Cache miss → Prompt → LLM → Parser → Cache → Trust score → Result
//! Screenshot → Vision prompt → LLM → Parser → Dark pattern report
//! Question   → Chat prompt   → LLM → Answer
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use clausewise_analyzer::{Analyzer, AnalyzerConfig, AnalysisRequest};
//! use clausewise_domain::Persona;
//! use clausewise_llm::MockProvider;
//! use clausewise_store::{InMemoryAnalysisCache, InMemoryTrustStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"overall_risk":"low","summary":"ok","notable_clauses":[]}"#);
//! let analyzer = Analyzer::new(
//!     Arc::new(llm),
//!     Arc::new(InMemoryAnalysisCache::new()),
//!     Arc::new(InMemoryTrustStore::new()),
//!     AnalyzerConfig::default(),
//! );
//!
//! let outcome = analyzer
//!     .analyze(AnalysisRequest {
//!         text: "By using this site you agree to be nice.".to_string(),
//!         url: Some("https://example.com/terms".to_string()),
//!         persona: Persona::Developer,
//!     })
//!     .await?;
//!
//! println!("Risk: {}", outcome.result.overall_risk);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod image;
mod parser;
mod prompt;
mod types;


pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use error::{AnalyzerError, SchemaIssue};
pub use image::{ImagePayload, DEFAULT_IMAGE_MIME};
pub use parser::{parse_analysis, parse_dark_patterns};
pub use prompt::{
    build_chat_request, build_vision_request, persona_role, truncate_chars, PromptBuilder,
    DARK_PATTERN_CATEGORIES,
};
pub use types::{AnalysisOutcome, AnalysisRequest, ChatRequest, TrustReport};
