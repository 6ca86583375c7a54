//! Best-effort cache access shared by every cached repository.
//!
//! Reads never fail: errors and undecodable bytes count as misses. Writes
//! return a [`CacheWrite`] that is logged and counted but never propagated.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use refcache_core::cache::{deserialize, serialize, Cache, CacheError, CacheStats, CacheWrite};

pub struct CacheAside<C: Cache + ?Sized> {
    cache: Arc<C>,
    stats: Arc<CacheStats>,
}

impl<C: Cache + ?Sized> CacheAside<C> {
    pub fn new(cache: Arc<C>, stats: Arc<CacheStats>) -> Self {
        Self { cache, stats }
    }

    pub fn stats(&self) -> &Arc<CacheStats> {
        &self.stats
    }

    pub fn set_stats(&mut self, stats: Arc<CacheStats>) {
        self.stats = stats;
    }

    /// Looks up `key`, returning `None` on miss or on any cache failure.
    pub async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(bytes)) => match deserialize::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(key, "Cache hit");
                    self.stats.record_hit();
                    Some(value)
                }
                Err(err) => {
                    // Corrupt entry - treat as cache miss
                    tracing::warn!(key, error = %err, "Cache entry deserialization failed");
                    self.stats.record_read_failure();
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(key, "Cache miss");
                self.stats.record_miss();
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Cache read failed, falling back to source");
                self.stats.record_read_failure();
                None
            }
        }
    }

    /// Serializes `value` and stores it under `key`.
    pub async fn store<T: Serialize + ?Sized + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheWrite {
        let outcome = match serialize(value) {
            Ok(bytes) => CacheWrite::from(self.cache.set(key, &bytes, ttl).await),
            Err(err) => CacheWrite::Degraded(CacheError::from(err)),
        };
        if let CacheWrite::Degraded(err) = &outcome {
            tracing::warn!(key, error = %err, "Failed to populate cache");
            self.stats.record_write_failure();
        }
        outcome
    }

    /// Deletes every key in order. Each delete is independent.
    pub async fn invalidate(&self, keys: &[String]) -> CacheWrite {
        let mut outcome = CacheWrite::Applied;
        for key in keys {
            if let Err(err) = self.cache.delete(key).await {
                tracing::warn!(key = %key, error = %err, "Failed to invalidate cache key");
                self.stats.record_write_failure();
                outcome = outcome.and(CacheWrite::Degraded(err));
            }
        }
        outcome
    }
}
