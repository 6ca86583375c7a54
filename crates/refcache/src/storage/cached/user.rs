//! Cached user repository.
//!
//! The cached form of a [`User`] has no password hash, so credential checks
//! must go through [`CachedRepository::get_by_username_for_auth`], which
//! never touches the cache.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::User;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedUserRepository<R, C> = CachedRepository<User, R, C>;

impl CachedEntity for User {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::standard(base_ttl)
    }
}

impl<R, C> CachedRepository<User, R, C>
where
    R: Repository<User>,
    C: Cache + ?Sized,
{
    /// Profile lookup by username. The result carries no credentials.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_by_natural_key("username", username).await
    }

    /// Lookup for authentication. Always reads the base repository and
    /// never writes the result to the cache.
    pub async fn get_by_username_for_auth(&self, username: &str) -> Result<Option<User>> {
        self.aside.stats().record_bypass();
        tracing::trace!(username, "Credential lookup bypasses cache");
        self.find_in_source("username", username).await
    }
}
