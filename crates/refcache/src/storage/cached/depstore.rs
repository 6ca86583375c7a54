//! Cached depstore (warehouse / store location) repository.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::Depstore;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedDepstoreRepository<R, C> = CachedRepository<Depstore, R, C>;

impl CachedEntity for Depstore {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::reference(base_ttl)
    }
}

impl<R, C> CachedRepository<Depstore, R, C>
where
    R: Repository<Depstore>,
    C: Cache + ?Sized,
{
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Depstore>> {
        self.get_by_natural_key("code", code).await
    }

    /// Locations belonging to `company_id`, served from the cached collection.
    pub async fn get_by_company(&self, company_id: &str) -> Result<Vec<Depstore>> {
        let all = self.get_all().await?;
        Ok(all
            .into_iter()
            .filter(|d| d.company_id == company_id)
            .collect())
    }
}
