//! Application state: base repositories, their cached decorators and the
//! cache manager, wired for the backend selected at compile time.

use std::sync::Arc;
use std::time::Duration;

use refcache_core::cache::{Cache, CacheStats};
use refcache_core::entities::{
    Article, Classification, Color, Company, Customer, Depstore, Division, User,
};

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::manager::{CacheManager, WarmTargets};
use crate::storage::cached::{
    CachedArticleRepository, CachedClassificationRepository, CachedColorRepository,
    CachedCompanyRepository, CachedCustomerRepository, CachedDepstoreRepository,
    CachedDivisionRepository, CachedEntity, CachedRepository, CachedUserRepository,
};
use crate::storage::inmemory::InMemoryRepository;

// Cache features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' cache features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Must enable exactly one cache feature: 'memory' or 'redis'");

/// The source-of-truth repositories.
///
/// Large or frequently searched tables get a dedicated natural-key finder;
/// the small reference tables are scanned.
#[derive(Debug, Clone)]
pub struct BaseRepositories {
    pub articles: Arc<InMemoryRepository<Article>>,
    pub classifications: Arc<InMemoryRepository<Classification>>,
    pub companies: Arc<InMemoryRepository<Company>>,
    pub customers: Arc<InMemoryRepository<Customer>>,
    pub colors: Arc<InMemoryRepository<Color>>,
    pub depstores: Arc<InMemoryRepository<Depstore>>,
    pub divisions: Arc<InMemoryRepository<Division>>,
    pub users: Arc<InMemoryRepository<User>>,
}

impl Default for BaseRepositories {
    fn default() -> Self {
        Self {
            articles: Arc::new(InMemoryRepository::with_indexed_lookup()),
            classifications: Arc::new(InMemoryRepository::new()),
            companies: Arc::new(InMemoryRepository::new()),
            customers: Arc::new(InMemoryRepository::with_indexed_lookup()),
            colors: Arc::new(InMemoryRepository::new()),
            depstores: Arc::new(InMemoryRepository::new()),
            divisions: Arc::new(InMemoryRepository::new()),
            users: Arc::new(InMemoryRepository::with_indexed_lookup()),
        }
    }
}

type Repo<E> = InMemoryRepository<E>;

/// Shared application state.
///
/// Every cached repository shares one cache and one statistics sink.
#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<CachedArticleRepository<Repo<Article>, dyn Cache>>,
    pub classifications: Arc<CachedClassificationRepository<Repo<Classification>, dyn Cache>>,
    pub companies: Arc<CachedCompanyRepository<Repo<Company>, dyn Cache>>,
    pub customers: Arc<CachedCustomerRepository<Repo<Customer>, dyn Cache>>,
    pub colors: Arc<CachedColorRepository<Repo<Color>, dyn Cache>>,
    pub depstores: Arc<CachedDepstoreRepository<Repo<Depstore>, dyn Cache>>,
    pub divisions: Arc<CachedDivisionRepository<Repo<Division>, dyn Cache>>,
    pub users: Arc<CachedUserRepository<Repo<User>, dyn Cache>>,

    pub manager: Arc<CacheManager<dyn Cache>>,
    pub stats: Arc<CacheStats>,
    pub base: BaseRepositories,
    /// Set when the memory backend owns the expiry sweep.
    memory_cache: Option<MemoryCache>,
}

impl AppState {
    fn build(
        base: BaseRepositories,
        cache: Arc<dyn Cache>,
        memory_cache: Option<MemoryCache>,
        config: &Config,
    ) -> Self {
        let ttl = config.cache_ttl();
        let stats = Arc::new(CacheStats::new());

        let articles = Arc::new(cached(base.articles.clone(), &cache, &stats, ttl));
        let classifications = Arc::new(cached(base.classifications.clone(), &cache, &stats, ttl));
        let companies = Arc::new(cached(base.companies.clone(), &cache, &stats, ttl));
        let customers = Arc::new(cached(base.customers.clone(), &cache, &stats, ttl));
        let colors = Arc::new(cached(base.colors.clone(), &cache, &stats, ttl));
        let depstores = Arc::new(cached(base.depstores.clone(), &cache, &stats, ttl));
        let divisions = Arc::new(cached(base.divisions.clone(), &cache, &stats, ttl));
        let users = Arc::new(cached(base.users.clone(), &cache, &stats, ttl));

        let targets = WarmTargets {
            classifications: classifications.clone(),
            companies: companies.clone(),
            colors: colors.clone(),
            divisions: divisions.clone(),
            depstores: depstores.clone(),
            customers: customers.clone(),
            articles: articles.clone(),
        };
        let manager = Arc::new(CacheManager::new(targets, cache, config.warm_limit));

        Self {
            articles,
            classifications,
            companies,
            customers,
            colors,
            depstores,
            divisions,
            users,
            manager,
            stats,
            base,
            memory_cache,
        }
    }

    /// Starts the expiry sweep when the backend needs one.
    pub fn start_sweeper(&self, interval: Duration) {
        if let Some(cache) = &self.memory_cache {
            cache.start_sweeper(interval);
        }
    }

    pub async fn stop_sweeper(&self) {
        if let Some(cache) = &self.memory_cache {
            cache.stop_sweeper().await;
        }
    }
}

fn cached<E: CachedEntity>(
    repository: Arc<InMemoryRepository<E>>,
    cache: &Arc<dyn Cache>,
    stats: &Arc<CacheStats>,
    ttl: Duration,
) -> CachedRepository<E, InMemoryRepository<E>, dyn Cache> {
    CachedRepository::with_default_policy(repository, cache.clone(), ttl).with_stats(stats.clone())
}

// ============================================================================
// Factory functions for each cache backend
// ============================================================================

#[cfg(feature = "memory")]
mod memory_backend {
    use super::*;

    impl AppState {
        /// Creates AppState over `base` with the in-process cache.
        pub async fn new(base: BaseRepositories, config: &Config) -> Result<Self, anyhow::Error> {
            Ok(Self::with_memory_cache(base, config))
        }
    }
}

impl AppState {
    /// Creates AppState over `base` with an in-process cache, whatever
    /// backend the binary was built for.
    pub fn with_memory_cache(base: BaseRepositories, config: &Config) -> Self {
        let memory_cache = MemoryCache::new();
        let cache: Arc<dyn Cache> = Arc::new(memory_cache.clone());
        Self::build(base, cache, Some(memory_cache), config)
    }
}

#[cfg(feature = "redis")]
mod redis_backend {
    use super::*;
    use crate::cache::RedisCache;

    impl AppState {
        /// Creates AppState over `base` with a Redis cache.
        ///
        /// Redis expires keys on its own, so no sweeper runs.
        pub async fn new(base: BaseRepositories, config: &Config) -> Result<Self, anyhow::Error> {
            let cache: Arc<dyn Cache> = Arc::new(RedisCache::new(&config.redis_url).await?);
            Ok(Self::build(base, cache, None, config))
        }
    }
}
