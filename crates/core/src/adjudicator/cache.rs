//! Time-boxed, size-bounded word verdict cache.
//!
//! Shared by every concurrent candidate evaluation. Reads take a shared lock;
//! inserts and expiry removal take the write lock. Two writers racing on the
//! same key simply leave the last write in place.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::metrics;
use crate::text::normalize_word;

/// Fraction of capacity removed per eviction pass.
const EVICTION_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    word: String,
    language: String,
}

impl CacheKey {
    fn new(word: &str, language: &str) -> Self {
        Self {
            word: normalize_word(word),
            language: language.trim().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    valid: bool,
    created_at: Instant,
}

/// Counters exposed through [`ValidationCache::stats`].
#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_secs: u64,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub inserts: u64,
    pub evictions: u64,
}

/// Word verdict cache keyed by (normalized word, language).
#[derive(Debug)]
pub struct ValidationCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    capacity: usize,
    ttl: Duration,
    counters: Counters,
}

impl ValidationCache {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
            counters: Counters::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Entries removed by one eviction pass: 20% of capacity, at least one.
    pub fn eviction_batch(&self) -> usize {
        ((self.capacity as f64 * EVICTION_FRACTION).ceil() as usize).max(1)
    }

    /// Cached verdict, or `None` when absent or expired.
    pub async fn get(&self, word: &str, language: &str) -> Option<bool> {
        self.get_at(word, language, Instant::now()).await
    }

    /// [`get`](Self::get) evaluated as if the current time were `now`.
    pub async fn get_at(&self, word: &str, language: &str, now: Instant) -> Option<bool> {
        let key = CacheKey::new(word, language);

        let entry = self.entries.read().await.get(&key).copied();
        match entry {
            Some(entry) if !self.is_expired(&entry, now) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.valid)
            }
            Some(_) => {
                let mut entries = self.entries.write().await;
                // Another writer may have refreshed the entry meanwhile.
                if let Some(current) = entries.get(&key) {
                    if self.is_expired(current, now) {
                        entries.remove(&key);
                        self.counters.expirations.fetch_add(1, Ordering::Relaxed);
                        debug!(word = %key.word, "Cache entry expired");
                    }
                }
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a verdict.
    pub async fn insert(&self, word: &str, language: &str, valid: bool) {
        self.insert_at(word, language, valid, Instant::now()).await
    }

    /// [`insert`](Self::insert) with an explicit creation time.
    pub async fn insert_at(&self, word: &str, language: &str, valid: bool, created_at: Instant) {
        let key = CacheKey::new(word, language);
        let mut entries = self.entries.write().await;
        entries.insert(key.clone(), CacheEntry { valid, created_at });
        self.counters.inserts.fetch_add(1, Ordering::Relaxed);

        if entries.len() > self.capacity {
            let evicted = self.evict_oldest(&mut entries, &key);
            self.counters
                .evictions
                .fetch_add(evicted as u64, Ordering::Relaxed);
            metrics::CACHE_EVICTIONS.inc_by(evicted as u64);
            debug!(
                evicted,
                remaining = entries.len(),
                "Validation cache over capacity, evicted oldest entries"
            );
        }
    }

    /// Remove the oldest-created entries, never `keep`.
    fn evict_oldest(&self, entries: &mut HashMap<CacheKey, CacheEntry>, keep: &CacheKey) -> usize {
        let mut candidates: Vec<(Instant, CacheKey)> = entries
            .iter()
            .filter(|(k, _)| *k != keep)
            .map(|(k, e)| (e.created_at, k.clone()))
            .collect();
        candidates.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| a.1.word.cmp(&b.1.word))
                .then_with(|| a.1.language.cmp(&b.1.language))
        });

        let batch = self.eviction_batch();
        candidates
            .into_iter()
            .take(batch)
            .filter(|(_, key)| entries.remove(key).is_some())
            .count()
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.created_at) > self.ttl
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            capacity: self.capacity,
            ttl_secs: self.ttl.as_secs(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            inserts: self.counters.inserts.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_hit_and_miss() {
        let cache = ValidationCache::new(10, HOUR);
        assert_eq!(cache.get("cat", "en").await, None);

        cache.insert("cat", "en", true).await;
        assert_eq!(cache.get("CAT", "en").await, Some(true));
        assert_eq!(cache.get(" Cat ", "EN").await, Some(true));
        assert_eq!(cache.get("cat", "sk").await, None);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.inserts, 1);
    }

    #[tokio::test]
    async fn test_negative_verdicts_are_cached() {
        let cache = ValidationCache::new(10, HOUR);
        cache.insert("xyzzy", "en", false).await;
        assert_eq!(cache.get("XYZZY", "en").await, Some(false));
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let ttl = Duration::from_secs(60);
        let cache = ValidationCache::new(10, ttl);
        let t0 = Instant::now();
        cache.insert_at("cat", "en", true, t0).await;

        assert_eq!(cache.get_at("cat", "en", t0 + ttl).await, Some(true));
        assert_eq!(
            cache
                .get_at("cat", "en", t0 + ttl + Duration::from_millis(1))
                .await,
            None
        );
        // Expired entry is dropped on access.
        assert!(cache.is_empty().await);
        assert_eq!(cache.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_eviction_removes_oldest_fifth() {
        let cache = ValidationCache::new(10, HOUR);
        let t0 = Instant::now();
        for i in 0..10 {
            cache
                .insert_at(&format!("w{i}"), "en", true, t0 + Duration::from_secs(i))
                .await;
        }
        assert_eq!(cache.len().await, 10);

        cache
            .insert_at("newest", "en", true, t0 + Duration::from_secs(100))
            .await;

        // 11 entries over capacity 10: the two oldest go.
        assert_eq!(cache.len().await, 9);
        let now = t0 + Duration::from_secs(101);
        assert_eq!(cache.get_at("w0", "en", now).await, None);
        assert_eq!(cache.get_at("w1", "en", now).await, None);
        assert_eq!(cache.get_at("w2", "en", now).await, Some(true));
        assert_eq!(cache.get_at("newest", "en", now).await, Some(true));
        assert_eq!(cache.stats().await.evictions, 2);
    }

    #[tokio::test]
    async fn test_eviction_never_drops_just_inserted_entry() {
        let cache = ValidationCache::new(1, HOUR);
        let t0 = Instant::now();
        cache.insert_at("late", "en", true, t0 + Duration::from_secs(10)).await;
        // Older timestamp than the resident entry, still survives.
        cache.insert_at("early", "en", true, t0).await;

        assert_eq!(cache.len().await, 1);
        let now = t0 + Duration::from_secs(11);
        assert_eq!(cache.get_at("early", "en", now).await, Some(true));
        assert_eq!(cache.get_at("late", "en", now).await, None);
    }

    #[tokio::test]
    async fn test_eviction_batch_size() {
        assert_eq!(ValidationCache::new(10, HOUR).eviction_batch(), 2);
        assert_eq!(ValidationCache::new(3, HOUR).eviction_batch(), 1);
        assert_eq!(ValidationCache::new(1, HOUR).eviction_batch(), 1);
        assert_eq!(ValidationCache::new(101, HOUR).eviction_batch(), 21);
    }

    #[tokio::test]
    async fn test_concurrent_writes_same_key() {
        let cache = std::sync::Arc::new(ValidationCache::new(100, HOUR));
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.insert("race", "en", i % 2 == 0).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("race", "en").await.is_some());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = ValidationCache::new(10, HOUR);
        cache.insert("a", "en", true).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
