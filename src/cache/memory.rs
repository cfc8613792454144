//! In-memory cache implementation using moka
//!
//! Provides a fast, thread-safe in-memory cache for fetched list pages.
//!
//! # Features
//! - Freshness decided by the reader: each entry records when it was
//!   written and `get_fresh` compares its age with the caller's window
//! - Prefix invalidation (drop every page of one resource)
//! - Capacity-bounded with a global time-to-live for eviction

use anyhow::{Context, Result};
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 1_000;

/// Default eviction TTL (5 minutes)
const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache entry wrapper that stores serialized JSON data
#[derive(Clone)]
struct CacheEntry {
    /// JSON-serialized value
    data: Arc<String>,
    /// When the value was written
    fetched_at: Instant,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
            fetched_at: Instant::now(),
        })
    }

    fn is_fresh(&self, max_age: Duration) -> bool {
        self.fetched_at.elapsed() < max_age
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// In-memory cache using moka
///
/// Values are stored as JSON strings so one cache can hold pages of any
/// item type. moka's `time_to_live` only bounds memory; whether an entry
/// is fresh enough is up to each reader.
pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a new memory cache with default settings
    pub fn new() -> Self {
        Self::with_capacity_and_ttl(DEFAULT_MAX_CAPACITY, DEFAULT_TTL)
    }

    /// Create a new memory cache with custom capacity and eviction TTL
    ///
    /// # Arguments
    /// * `max_capacity` - Maximum number of entries the cache can hold
    /// * `default_ttl` - Eviction TTL and the freshness window used by `get`
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl.max(Duration::from_millis(1)))
            .build();

        Self { cache, default_ttl }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a value written less than `default_ttl` ago
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get_fresh(key, self.default_ttl).await
    }

    /// Get a value written less than `max_age` ago
    ///
    /// Older entries are left in place for readers with a longer window;
    /// eviction removes them.
    pub async fn get_fresh<T: DeserializeOwned>(
        &self,
        key: &str,
        max_age: Duration,
    ) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_fresh(max_age) => Ok(Some(entry.deserialize()?)),
            _ => Ok(None),
        }
    }

    /// Store a value, stamping it with the current time
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    /// Delete every entry whose key starts with `prefix`
    pub async fn delete_prefix(&self, prefix: &str) {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys {
            self.cache.invalidate(&key).await;
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string()).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let cache = MemoryCache::new();
        let result: Option<String> = cache.get("nope").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_freshness_is_decided_by_reader() {
        let cache = MemoryCache::new();
        cache.set("page", &42u32).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        let short: Option<u32> = cache.get_fresh("page", Duration::from_millis(10)).await.unwrap();
        assert!(short.is_none());

        let long: Option<u32> = cache.get_fresh("page", Duration::from_secs(60)).await.unwrap();
        assert_eq!(long, Some(42));
    }

    #[tokio::test]
    async fn test_zero_max_age_never_hits() {
        let cache = MemoryCache::new();
        cache.set("page", &1u32).await.unwrap();

        let result: Option<u32> = cache.get_fresh("page", Duration::ZERO).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_entry_evicted_after_ttl() {
        let cache = MemoryCache::with_capacity_and_ttl(10, Duration::from_millis(10));
        cache.set("short", &42u32).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        let evicted: Option<u32> = cache.get_fresh("short", Duration::from_secs(60)).await.unwrap();
        assert!(evicted.is_none());
    }

    #[tokio::test]
    async fn test_delete_prefix_only_touches_prefix() {
        let cache = MemoryCache::new();
        cache.set("config-center:{\"pageIndex\":1}", &1u32).await.unwrap();
        cache.set("config-center:{\"pageIndex\":2}", &2u32).await.unwrap();
        cache.set("welcome-table:{\"pageIndex\":1}", &3u32).await.unwrap();

        cache.delete_prefix("config-center:").await;

        let a: Option<u32> = cache.get("config-center:{\"pageIndex\":1}").await.unwrap();
        let b: Option<u32> = cache.get("welcome-table:{\"pageIndex\":1}").await.unwrap();
        assert!(a.is_none());
        assert_eq!(b, Some(3));
    }

    #[tokio::test]
    async fn test_wrong_type_is_an_error() {
        let cache = MemoryCache::new();
        cache.set("n", &"text").await.unwrap();

        let result: Result<Option<u32>> = cache.get("n").await;
        assert!(result.is_err());
    }
}
