//! Clausewise Storage Layer
//!
//! Process-local state behind the analysis service: the result cache and the
//! per-site trust scores.
//!
//! # Architecture
//!
//! Both stores sit behind async traits ([`AnalysisCache`], [`TrustScoreStore`])
//! so the in-memory maps used today can be swapped for an external key-value
//! store without touching callers. Everything here is lost on restart.
//!
//! # Examples
//!
//! ```
//! use clausewise_store::{AnalysisCache, InMemoryAnalysisCache};
//! use clausewise_domain::{AnalysisResult, Persona, RiskLevel};
//!
//! # async fn example() -> Result<(), clausewise_store::StoreError> {
//! let cache = InMemoryAnalysisCache::new();
//! let result = AnalysisResult {
//!     overall_risk: RiskLevel::Low,
//!     summary: "Nothing unusual".to_string(),
//!     notable_clauses: vec![],
//!     trust_score: None,
//!     data_collection: None,
//! };
//!
//! cache.put("some terms", Persona::Standard, result.clone()).await?;
//! assert_eq!(cache.get("some terms", Persona::Standard).await?, Some(result));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod clock;
pub mod trust;

use async_trait::async_trait;
use clausewise_domain::{AnalysisResult, Persona, RiskLevel, TrustScore};
use thiserror::Error;

pub use cache::{cache_key, fingerprint, CacheEntry, CacheStats, InMemoryAnalysisCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use trust::InMemoryTrustStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// A lock guarding shared state was poisoned by a panicking writer
    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Backing store could not be reached
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Cache of analysis results keyed by content fingerprint and persona
///
/// The key never involves the page URL: identical text analyzed for the same
/// persona shares one entry regardless of where it was found.
#[async_trait]
pub trait AnalysisCache: Send + Sync {
    /// Look up a live (unexpired) result
    async fn get(&self, text: &str, persona: Persona) -> Result<Option<AnalysisResult>, StoreError>;

    /// Store a result, replacing any previous entry under the same key
    async fn put(&self, text: &str, persona: Persona, result: AnalysisResult) -> Result<(), StoreError>;

    /// Hit/miss counters and entry count
    async fn stats(&self) -> Result<CacheStats, StoreError>;
}

/// Per-site trust scores
#[async_trait]
pub trait TrustScoreStore: Send + Sync {
    /// Apply the adjustment for `risk` to the score for `url` and return the
    /// new score. An unseen URL starts from neutral.
    async fn update(&self, url: &str, risk: RiskLevel) -> Result<TrustScore, StoreError>;

    /// Current score for `url`, if it has ever been updated
    async fn score(&self, url: &str) -> Result<Option<TrustScore>, StoreError>;

    /// Band label for `url`, neutral when no score exists
    async fn band_label(&self, url: &str) -> Result<String, StoreError> {
        let score = self.score(url).await?.unwrap_or_default();
        Ok(score.band().label().to_string())
    }
}
