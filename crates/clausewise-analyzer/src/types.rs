//! Request and result types for the Analyzer

use clausewise_domain::{AnalysisResult, ChatMessage, Persona, TrustScore};
use serde::Serialize;

/// Request to analyze a document
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Full document text
    pub text: String,

    /// Page the text came from; enables trust score tracking
    pub url: Option<String>,

    /// Lens to analyze through
    pub persona: Persona,
}

/// Result of an analysis and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    /// The analysis, with `trust_score` attached when a URL was given
    #[serde(flatten)]
    pub result: AnalysisResult,

    /// Whether the result was served from the cache
    pub from_cache: bool,
}

/// Request to ask a question about a document
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Document text the conversation is about
    pub text: String,

    /// The new question
    pub message: String,

    /// Earlier turns, oldest first
    pub history: Vec<ChatMessage>,
}

/// Current trust standing of a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustReport {
    /// Site URL as supplied
    pub url: String,

    /// Raw score, absent if the site was never analyzed
    pub score: Option<TrustScore>,

    /// Band label, neutral when no score exists
    pub band: String,
}
