//! Cached division repository.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::Division;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedDivisionRepository<R, C> = CachedRepository<Division, R, C>;

impl CachedEntity for Division {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::reference(base_ttl)
    }
}

impl<R, C> CachedRepository<Division, R, C>
where
    R: Repository<Division>,
    C: Cache + ?Sized,
{
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Division>> {
        self.get_by_natural_key("code", code).await
    }
}
