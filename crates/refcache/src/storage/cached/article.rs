//! Cached article repository.
//!
//! Articles are the largest master-data table. Besides the usual key
//! families they cache search results under `article:search:<query>`. Search
//! entries are not invalidated on write (the set of cached queries is not
//! tracked) and instead use a short TTL.

use std::time::Duration;

use refcache_core::cache::{article_search_key, normalize_query, Cache};
use refcache_core::entities::Article;
use refcache_core::storage::{ArticleSearch, Repository, Result};

use super::policy::{CachePolicy, CachedEntity};
use super::repository::CachedRepository;

pub type CachedArticleRepository<R, C> = CachedRepository<Article, R, C>;

impl CachedEntity for Article {
    fn default_policy(base_ttl: Duration) -> CachePolicy {
        CachePolicy::standard(base_ttl).with_search_ttl(base_ttl / 3)
    }
}

impl<R, C> CachedRepository<Article, R, C>
where
    R: Repository<Article>,
    C: Cache + ?Sized,
{
    /// Looks an article up by its code.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Article>> {
        self.get_by_natural_key("code", code).await
    }
}

impl<R, C> CachedRepository<Article, R, C>
where
    R: Repository<Article> + ArticleSearch,
    C: Cache + ?Sized,
{
    /// Free-text article search, cached per normalized query.
    pub async fn search(&self, query: &str) -> Result<Vec<Article>> {
        let cache_key = article_search_key(query);

        if let Some(articles) = self.aside.read::<Vec<Article>>(&cache_key).await {
            return Ok(articles);
        }

        let articles = self
            .repository
            .search_articles(&normalize_query(query))
            .await?;
        let _ = self
            .aside
            .store(&cache_key, &articles, self.policy.search_ttl)
            .await;

        tracing::trace!(query, count = articles.len(), "Article search");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use super::super::test_support::CountingRepository;
    use crate::cache::MemoryCache;

    fn catalog() -> Vec<Article> {
        vec![
            Article::new("TS-001", "T-Shirt").with_id("a-1"),
            Article::new("TS-002", "Polo shirt").with_id("a-2"),
            Article::new("JN-001", "Jeans").with_id("a-3"),
        ]
    }

    async fn setup(
        ttl: Duration,
    ) -> (
        CachedArticleRepository<CountingRepository<Article>, MemoryCache>,
        Arc<CountingRepository<Article>>,
    ) {
        let base = Arc::new(CountingRepository::new());
        base.inner().seed(catalog()).await.unwrap();
        let cached =
            CachedRepository::with_default_policy(base.clone(), Arc::new(MemoryCache::new()), ttl);
        (cached, base)
    }

    #[tokio::test]
    async fn test_search_is_cached_per_normalized_query() {
        let (cached, base) = setup(Duration::from_secs(900)).await;

        let first = cached.search("Shirt").await.unwrap();
        assert_eq!(first.len(), 2);

        let second = cached.search("  shirt ").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(base.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_not_invalidated_by_writes() {
        let (cached, base) = setup(Duration::from_secs(900)).await;

        assert_eq!(cached.search("shirt").await.unwrap().len(), 2);

        cached
            .create(&Article::new("TS-003", "Dress shirt").with_id("a-4"))
            .await
            .unwrap();

        // Stale until the search TTL runs out
        assert_eq!(cached.search("shirt").await.unwrap().len(), 2);
        assert_eq!(base.search_calls(), 1);

        // The collection, on the other hand, is fresh
        assert_eq!(cached.get_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_expires_after_search_ttl() {
        // Search TTL is a third of the base: 60ms
        let (cached, base) = setup(Duration::from_millis(180)).await;
        assert_eq!(cached.policy().search_ttl, Duration::from_millis(60));

        cached.search("shirt").await.unwrap();
        cached
            .create(&Article::new("TS-003", "Dress shirt").with_id("a-4"))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cached.search("shirt").await.unwrap().len(), 3);
        assert_eq!(base.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_get_by_code() {
        let (cached, base) = setup(Duration::from_secs(900)).await;

        let jeans = cached.get_by_code("JN-001").await.unwrap().unwrap();
        assert_eq!(jeans.id, "a-3");
        cached.get_by_code("JN-001").await.unwrap();
        assert_eq!(base.get_all_calls(), 1);

        assert!(cached.get_by_code("XX-999").await.unwrap().is_none());
    }
}
