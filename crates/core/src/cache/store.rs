//! Read-through TTL store.
//!
//! Values are held as `serde_json::Value` so one store serves every result
//! type behind the service boundary. Expiry is checked on every read; the
//! periodic sweep only bounds memory and is never required for correctness.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::Error;

/// A single cached result with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory read-through cache with per-entry expiry.
///
/// Concurrent `get_or_compute` calls on different keys never block each
/// other beyond the brief map lock. Concurrent misses on the same key may
/// each invoke their producer; the last writer wins, which is acceptable
/// because producers are idempotent reads of the upstream API.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    /// Create a cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self { entries: RwLock::new(HashMap::new()), default_ttl }
    }

    /// Return the cached value for `key`, or invoke `producer` and store its
    /// result for `ttl` (falling back to the default TTL).
    ///
    /// A failed producer stores nothing; its error propagates unmodified.
    /// An unreadable cached value is treated as a miss and recomputed.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, ttl: Option<Duration>, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let now = Utc::now();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key)
                && entry.is_fresh(now)
            {
                match serde_json::from_value(entry.value.clone()) {
                    Ok(value) => {
                        tracing::debug!(key, "cache hit");
                        return Ok(value);
                    }
                    Err(e) => {
                        tracing::warn!(key, error = %e, "cached value unreadable, recomputing");
                    }
                }
            }
        }

        // Lock released before the producer runs; a slow upstream call must
        // not stall unrelated keys.
        tracing::debug!(key, "cache miss");
        let value = producer().await?;

        match serde_json::to_value(&value) {
            Ok(json) => {
                self.insert(key, json, ttl).await;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "result not cacheable, serving uncached");
            }
        }

        Ok(value)
    }

    /// Store a value under `key` with the given TTL (default TTL when None).
    pub async fn insert(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        // A TTL too large to represent never expires.
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Remove every key matching `pattern` (regular-expression semantics).
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate(&self, pattern: &str) -> Result<usize, Error> {
        let regex = Regex::new(pattern).map_err(|e| Error::InvalidPattern(e.to_string()))?;

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !regex.is_match(key));
        let removed = before - entries.len();

        tracing::info!(pattern, removed, "cache invalidated");
        Ok(removed)
    }

    /// Remove expired entries. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        before - entries.len()
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Spawn the periodic housekeeping task that purges expired entries.
pub fn spawn_sweeper(cache: Arc<MemoryCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so a fresh cache
        // isn't swept at startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.purge_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "cache sweep");
            }
        }
    })
}
