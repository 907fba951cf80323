//! TTL cache for slow-changing reference data
//!
//! Spaces, issue types and priorities rarely change, so handlers keep them
//! for a few minutes. One cache is built at startup and shared through the
//! handler context; tests build their own.
//!
//! The lock is never held across the fetch, so two concurrent misses on the
//! same key both run the fetcher and the last writer wins.

use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Default time-to-live for cached entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Size and key listing, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// In-memory key/value cache with per-entry expiry.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drop a single entry.
    pub fn clear_entry(&self, key: &str) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Whether `key` holds an unexpired value. Never fetches.
    pub fn is_fresh(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .map_or(false, |entry| entry.is_fresh(now))
    }

    /// Current size and keys, sorted.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Return the cached value for `key`, or run `fetcher` and store its
    /// result for `ttl`.
    ///
    /// Failed fetches are not stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(key) {
            debug!(key, "cache hit");
            return Ok(value);
        }

        debug!(key, ttl_secs = ttl.as_secs(), "cache miss");
        let value = fetcher().await?;

        let entry = CacheEntry {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entry);

        Ok(value)
    }

    fn get_fresh(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn fetch_counted(calls: &AtomicUsize) -> Result<usize, String> {
        Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_once_within_ttl() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        let first = cache.get_or_fetch("k", ttl, || fetch_counted(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.get_or_fetch("k", ttl, || fetch_counted(&calls)).await.unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_expiry() {
        let cache = TtlCache::new();
        let calls = AtomicUsize::new(0);
        let ttl = Duration::from_secs(60);

        cache.get_or_fetch("k", ttl, || fetch_counted(&calls)).await.unwrap();
        assert!(cache.is_fresh("k"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!cache.is_fresh("k"));

        let value = cache.get_or_fetch("k", ttl, || fetch_counted(&calls)).await.unwrap();
        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: TtlCache<usize> = TtlCache::new();

        let failed: Result<usize, String> = cache
            .get_or_fetch("k", DEFAULT_TTL, || async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(!cache.is_fresh("k"));

        let ok: Result<usize, String> = cache.get_or_fetch("k", DEFAULT_TTL, || async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_clear_and_stats() {
        let cache = TtlCache::new();
        for key in ["b", "a"] {
            let _: Result<i32, ()> = cache.get_or_fetch(key, DEFAULT_TTL, || async { Ok(1) }).await;
        }

        assert_eq!(
            cache.stats(),
            CacheStats {
                size: 2,
                keys: vec!["a".to_string(), "b".to_string()],
            }
        );

        cache.clear_entry("a");
        assert!(!cache.is_fresh("a"));
        assert!(cache.is_fresh("b"));

        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }
}
