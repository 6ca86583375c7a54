use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Trait for basic cache operations.
///
/// `get` returns `Ok(None)` for absent or expired keys. Callers of the cache
/// layer do not distinguish a miss from an `Err`; both fall through to the
/// source of truth.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value that expires `ttl` from now, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Deletes a value from the cache by key. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
