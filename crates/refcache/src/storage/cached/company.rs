//! Cached company repository.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::Company;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedCompanyRepository<R, C> = CachedRepository<Company, R, C>;

impl CachedEntity for Company {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::reference(base_ttl)
    }
}

impl<R, C> CachedRepository<Company, R, C>
where
    R: Repository<Company>,
    C: Cache + ?Sized,
{
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Company>> {
        self.get_by_natural_key("code", code).await
    }
}
