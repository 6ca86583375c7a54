//! Cached color repository.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::Color;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedColorRepository<R, C> = CachedRepository<Color, R, C>;

impl CachedEntity for Color {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::reference(base_ttl)
    }
}

impl<R, C> CachedRepository<Color, R, C>
where
    R: Repository<Color>,
    C: Cache + ?Sized,
{
    /// Looks a color up by its code (e.g. `RED`).
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Color>> {
        self.get_by_natural_key("code", code).await
    }
}
