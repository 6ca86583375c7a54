//! In-memory cache implementation with TTL expiry.
//!
//! Entries expire lazily on read and are also removed by a periodic sweep
//! task, so keys that are never read again do not accumulate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;

use refcache_core::cache::{Cache, Result};

/// A single cache entry with an absolute expiry.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

type Store = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// Handle on a running sweep task.
struct Sweeper {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

/// In-memory cache with TTL support.
///
/// Thread-safe cache using a single `RwLock` over the whole map. Cloning
/// shares the same store. Each instance is independent; nothing is global.
#[derive(Clone, Default)]
pub struct MemoryCache {
    store: Store,
    sweeper: Arc<Mutex<Option<Sweeper>>>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("sweeper_running", &self.is_sweeping())
            .finish_non_exhaustive()
    }
}

impl MemoryCache {
    /// Creates a new, empty in-memory cache. The sweeper is not started.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the periodic expiry sweep on the current tokio runtime.
    ///
    /// Calling this while a sweeper is already running is a no-op.
    pub fn start_sweeper(&self, interval: Duration) {
        let Ok(mut slot) = self.sweeper.lock() else {
            tracing::error!("Sweeper lock poisoned, expiry sweep not started");
            return;
        };
        if slot.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let store = self.store.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = sweep(&store).await;
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired cache entries");
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Cache sweeper shutting down");
                        break;
                    }
                }
            }
        });

        tracing::debug!(interval_secs = interval.as_secs(), "Cache sweeper started");
        *slot = Some(Sweeper {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        });
    }

    /// Stops the sweep task and waits for it to finish.
    pub async fn stop_sweeper(&self) {
        let sweeper = match self.sweeper.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let Some(mut sweeper) = sweeper else {
            return;
        };

        if let Some(shutdown_tx) = sweeper.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = sweeper.handle.take() {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "Cache sweeper task ended abnormally");
            }
        }
    }

    /// Returns true while a sweep task is running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Removes every expired entry now. Returns the number removed.
    pub async fn sweep_expired(&self) -> usize {
        sweep(&self.store).await
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

async fn sweep(store: &Store) -> usize {
    let now = Instant::now();
    let mut store = store.write().await;
    let before = store.len();
    store.retain(|_, entry| !entry.is_expired_at(now));
    before - store.len()
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();

        // Read lock first to avoid write contention on hits
        {
            let store = self.store.read().await;
            match store.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired_at(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: remove it, re-checking in case it was overwritten meanwhile
        let mut store = self.store.write().await;
        match store.get(key) {
            Some(entry) if entry.is_expired_at(now) => {
                store.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut store = self.store.write().await;
        store.insert(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();
        let key = "color:001";
        let value = br#"{"id":"001","code":"RED"}"#;

        cache.set(key, value, Duration::from_secs(15 * 60)).await.unwrap();
        let result = cache.get(key).await.unwrap();

        assert_eq!(result, Some(value.to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("nonexistent:key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();
        let key = "test:delete";

        cache.set(key, b"to be deleted", TTL).await.unwrap();
        assert!(cache.get(key).await.unwrap().is_some());

        cache.delete(key).await.unwrap();
        assert!(cache.get(key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_noop() {
        let cache = MemoryCache::new();
        assert!(cache.delete("never:set").await.is_ok());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new();
        let key = "test:overwrite";

        cache.set(key, b"first", TTL).await.unwrap();
        cache.set(key, b"second", TTL).await.unwrap();

        assert_eq!(cache.get(key).await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new();
        let key = "test:ttl";

        cache
            .set(key, b"short-lived", Duration::from_millis(50))
            .await
            .unwrap();

        // Should exist immediately
        assert!(cache.get(key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        // Expired, and lazily removed by the read
        assert!(cache.get(key).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_resets_expiry() {
        let cache = MemoryCache::new();
        let key = "test:reset";

        cache.set(key, b"old", Duration::from_millis(50)).await.unwrap();
        cache.set(key, b"new", TTL).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(cache.get(key).await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_sweep_expired_removes_unread_entries() {
        let cache = MemoryCache::new();

        cache.set("short:1", b"1", Duration::from_millis(20)).await.unwrap();
        cache.set("short:2", b"2", Duration::from_millis(20)).await.unwrap();
        cache.set("long:1", b"3", TTL).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.sweep_expired().await, 2);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("long:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_background_sweeper() {
        let cache = MemoryCache::new();
        cache.start_sweeper(Duration::from_millis(20));
        assert!(cache.is_sweeping());

        cache.set("short:1", b"1", Duration::from_millis(10)).await.unwrap();
        cache.set("long:1", b"2", TTL).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        // Removed without ever being read
        assert_eq!(cache.len().await, 1);

        cache.stop_sweeper().await;
        assert!(!cache.is_sweeping());
    }

    #[tokio::test]
    async fn test_start_sweeper_is_idempotent() {
        let cache = MemoryCache::new();
        cache.start_sweeper(Duration::from_millis(20));
        cache.start_sweeper(Duration::from_millis(20));
        assert!(cache.is_sweeping());

        cache.stop_sweeper().await;
        // Stopping twice is harmless
        cache.stop_sweeper().await;
        assert!(!cache.is_sweeping());
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let a = MemoryCache::new();
        let b = MemoryCache::new();

        a.set("shared:key", b"a", TTL).await.unwrap();
        assert!(b.get("shared:key").await.unwrap().is_none());

        // Clones share the store
        let a2 = a.clone();
        assert!(a2.get("shared:key").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let cache = MemoryCache::new();
        let mut handles = Vec::new();

        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("concurrent:{}", i % 4);
                cache.set(&key, b"v", TTL).await.unwrap();
                let _ = cache.get(&key).await.unwrap();
                if i % 2 == 0 {
                    cache.delete(&key).await.unwrap();
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert!(cache.len().await <= 4);
    }
}
