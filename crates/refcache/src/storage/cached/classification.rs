//! Cached classification repository.

use std::time::Duration;

use refcache_core::cache::Cache;
use refcache_core::entities::Classification;
use refcache_core::storage::{Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedClassificationRepository<R, C> = CachedRepository<Classification, R, C>;

impl CachedEntity for Classification {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::reference(base_ttl)
    }
}

impl<R, C> CachedRepository<Classification, R, C>
where
    R: Repository<Classification>,
    C: Cache + ?Sized,
{
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Classification>> {
        self.get_by_natural_key("code", code).await
    }

    /// Direct children of `parent_id`, served from the cached collection.
    pub async fn get_children(&self, parent_id: &str) -> Result<Vec<Classification>> {
        let all = self.get_all().await?;
        Ok(all
            .into_iter()
            .filter(|c| c.parent_id.as_deref() == Some(parent_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use super::super::test_support::CountingRepository;
    use crate::cache::MemoryCache;

    #[tokio::test]
    async fn test_children_use_cached_collection() {
        let base = Arc::new(CountingRepository::new());
        base.inner()
            .seed([
                Classification::new("APP", "Apparel").with_id("c-1"),
                Classification::new("TOP", "Tops").with_id("c-2").with_parent("c-1"),
                Classification::new("BOT", "Bottoms").with_id("c-3").with_parent("c-1"),
                Classification::new("TEE", "T-Shirts").with_id("c-4").with_parent("c-2"),
            ])
            .await
            .unwrap();
        let cached = CachedRepository::with_default_policy(
            base.clone(),
            Arc::new(MemoryCache::new()),
            Duration::from_secs(900),
        );

        let mut children: Vec<String> = cached
            .get_children("c-1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.code)
            .collect();
        children.sort();
        assert_eq!(children, vec!["BOT", "TOP"]);

        assert_eq!(cached.get_children("c-2").await.unwrap().len(), 1);
        assert!(cached.get_children("c-4").await.unwrap().is_empty());
        assert_eq!(base.get_all_calls(), 1);
    }
}
