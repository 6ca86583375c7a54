//! Cached customer repository.
//!
//! Customers change more often than the reference tables, so the collection
//! entry lives no longer than a single row.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::Customer;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedCustomerRepository<R, C> = CachedRepository<Customer, R, C>;

impl CachedEntity for Customer {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::standard(base_ttl)
    }
}

impl<R, C> CachedRepository<Customer, R, C>
where
    R: Repository<Customer>,
    C: Cache + ?Sized,
{
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Customer>> {
        self.get_by_natural_key("code", code).await
    }
}
