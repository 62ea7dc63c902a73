//! In-memory trust score tracking

use crate::{StoreError, TrustScoreStore};
use async_trait::async_trait;
use clausewise_domain::{RiskLevel, TrustScore};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// In-memory [`TrustScoreStore`], keyed by the exact URL string
#[derive(Debug, Default)]
pub struct InMemoryTrustStore {
    scores: RwLock<HashMap<String, TrustScore>>,
}

impl InMemoryTrustStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sites with a score
    pub fn site_count(&self) -> usize {
        self.scores.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TrustScoreStore for InMemoryTrustStore {
    async fn update(&self, url: &str, risk: RiskLevel) -> Result<TrustScore, StoreError> {
        let mut scores = self
            .scores
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        let current = scores.get(url).copied().unwrap_or_default();
        let updated = current.adjust(risk);
        scores.insert(url.to_string(), updated);

        debug!(
            "Trust score for {}: {} -> {} ({})",
            url,
            current.value(),
            updated.value(),
            risk
        );
        Ok(updated)
    }

    async fn score(&self, url: &str) -> Result<Option<TrustScore>, StoreError> {
        let scores = self
            .scores
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(scores.get(url).copied())
    }
}
