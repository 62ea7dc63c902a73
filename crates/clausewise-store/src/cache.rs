//! Result cache keyed by content fingerprint
//!
//! Entries live for a fixed time-to-live measured from when they were written.
//! Expiry is checked on read only; an expired entry stays in the map until a
//! later `put` under the same key replaces it.

use crate::clock::{Clock, SystemClock};
use crate::{AnalysisCache, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use clausewise_domain::{AnalysisResult, Persona};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Default entry lifetime: 24 hours
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

/// Lowercase hex SHA-256 of the analyzed text
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Cache key for a (text, persona) pair
pub fn cache_key(text: &str, persona: Persona) -> String {
    format!("{}::{}", fingerprint(text), persona.as_str())
}

/// A cached analysis
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached result
    pub result: AnalysisResult,
    /// When the entry was written
    pub timestamp: DateTime<Utc>,
    /// Persona the result was produced for
    pub persona: Persona,
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing live
    pub misses: u64,
    /// Entries currently held, expired ones included
    pub entries: usize,
}

/// In-memory [`AnalysisCache`]
pub struct InMemoryAnalysisCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryAnalysisCache {
    /// Create a cache with the default 24 hour lifetime
    pub fn new() -> Self {
        Self::with_ttl(std::time::Duration::from_secs(DEFAULT_TTL_SECS))
    }

    /// Create a cache with a custom entry lifetime
    pub fn with_ttl(ttl: std::time::Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or(Duration::MAX),
            clock: Arc::new(SystemClock),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Use a different time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Raw entry lookup, ignoring expiry
    pub fn entry(&self, text: &str, persona: Persona) -> Result<Option<CacheEntry>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(entries.get(&cache_key(text, persona)).cloned())
    }

    fn is_live(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.timestamp < self.ttl
    }
}

impl Default for InMemoryAnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisCache for InMemoryAnalysisCache {
    async fn get(&self, text: &str, persona: Persona) -> Result<Option<AnalysisResult>, StoreError> {
        let key = cache_key(text, persona);
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        match entries.get(&key) {
            Some(entry) if self.is_live(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for {}", key);
                Ok(Some(entry.result.clone()))
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache entry expired for {}", key);
                Ok(None)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn put(&self, text: &str, persona: Persona, result: AnalysisResult) -> Result<(), StoreError> {
        let key = cache_key(text, persona);
        let entry = CacheEntry {
            result,
            timestamp: self.clock.now(),
            persona,
        };

        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        entries.insert(key, entry);
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use clausewise_domain::RiskLevel;

    fn result(risk: RiskLevel, summary: &str) -> AnalysisResult {
        AnalysisResult {
            overall_risk: risk,
            summary: summary.to_string(),
            notable_clauses: vec![],
            trust_score: None,
            data_collection: None,
        }
    }

    fn cache_with_clock() -> (InMemoryAnalysisCache, ManualClock) {
        let clock = ManualClock::default();
        let cache = InMemoryAnalysisCache::new().with_clock(Arc::new(clock.clone()));
        (cache, clock)
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(fingerprint("abc").len(), 64);
    }

    #[test]
    fn test_cache_key_includes_persona() {
        let key = cache_key("terms", Persona::Developer);
        assert!(key.ends_with("::developer"));
        assert_ne!(key, cache_key("terms", Persona::Parent));
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (cache, _clock) = cache_with_clock();

        assert_eq!(cache.get("terms", Persona::Standard).await.unwrap(), None);

        cache
            .put("terms", Persona::Standard, result(RiskLevel::Low, "ok"))
            .await
            .unwrap();
        let hit = cache.get("terms", Persona::Standard).await.unwrap();
        assert_eq!(hit, Some(result(RiskLevel::Low, "ok")));

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_persona_separates_entries() {
        let (cache, _clock) = cache_with_clock();
        cache
            .put("terms", Persona::Standard, result(RiskLevel::Low, "std"))
            .await
            .unwrap();

        assert_eq!(cache.get("terms", Persona::Parent).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expiry_is_read_time_only() {
        let (cache, clock) = cache_with_clock();
        cache
            .put("terms", Persona::Standard, result(RiskLevel::High, "bad"))
            .await
            .unwrap();

        clock.advance(Duration::hours(23) + Duration::minutes(59));
        assert!(cache.get("terms", Persona::Standard).await.unwrap().is_some());

        clock.advance(Duration::minutes(1));
        assert!(cache.get("terms", Persona::Standard).await.unwrap().is_none());

        // Still present, just not served
        assert!(cache.entry("terms", Persona::Standard).unwrap().is_some());
        assert_eq!(cache.stats().await.unwrap().entries, 1);
    }

    #[tokio::test]
    async fn test_put_supersedes() {
        let (cache, clock) = cache_with_clock();
        cache
            .put("terms", Persona::Standard, result(RiskLevel::High, "old"))
            .await
            .unwrap();
        clock.advance(Duration::hours(30));
        cache
            .put("terms", Persona::Standard, result(RiskLevel::Low, "new"))
            .await
            .unwrap();

        let hit = cache.get("terms", Persona::Standard).await.unwrap().unwrap();
        assert_eq!(hit.summary, "new");

        let entry = cache.entry("terms", Persona::Standard).unwrap().unwrap();
        assert_eq!(entry.persona, Persona::Standard);
        assert_eq!(entry.timestamp, clock.now());
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let clock = ManualClock::default();
        let cache = InMemoryAnalysisCache::with_ttl(std::time::Duration::from_secs(60))
            .with_clock(Arc::new(clock.clone()));
        cache
            .put("terms", Persona::Standard, result(RiskLevel::Low, "ok"))
            .await
            .unwrap();

        clock.advance(Duration::seconds(61));
        assert!(cache.get("terms", Persona::Standard).await.unwrap().is_none());
    }
}
