//! Mocks shared by the cached repository tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use refcache_core::cache::{Cache, CacheError, Result as CacheResult};
use refcache_core::entities::{Article, Entity};
use refcache_core::storage::{
    ArticleSearch, NaturalKeyLookup, Page, PageRequest, Repository, RepositoryError, Result,
};

use crate::storage::inmemory::InMemoryRepository;

/// Base repository that counts reads and can be told to fail them.
pub struct CountingRepository<E: Entity> {
    inner: InMemoryRepository<E>,
    get_by_id_calls: AtomicUsize,
    get_all_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
    pagination_calls: AtomicUsize,
    search_calls: AtomicUsize,
    fail_reads: AtomicBool,
}

impl<E: Entity> CountingRepository<E> {
    pub fn new() -> Self {
        Self::wrap(InMemoryRepository::new())
    }

    pub fn with_indexed_lookup() -> Self {
        Self::wrap(InMemoryRepository::with_indexed_lookup())
    }

    fn wrap(inner: InMemoryRepository<E>) -> Self {
        Self {
            inner,
            get_by_id_calls: AtomicUsize::new(0),
            get_all_calls: AtomicUsize::new(0),
            lookup_calls: AtomicUsize::new(0),
            pagination_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Direct access to the rows, bypassing the counters.
    pub fn inner(&self) -> &InMemoryRepository<E> {
        &self.inner
    }

    pub fn has_finder(&self) -> bool {
        self.inner.natural_key_lookup().is_some()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn get_by_id_calls(&self) -> usize {
        self.get_by_id_calls.load(Ordering::SeqCst)
    }

    pub fn get_all_calls(&self) -> usize {
        self.get_all_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    pub fn pagination_calls(&self) -> usize {
        self.pagination_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionFailed("database offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for CountingRepository<E> {
    async fn create(&self, entity: &E) -> Result<()> {
        self.inner.create(entity).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        self.get_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.inner.get_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.inner.get_all().await
    }

    async fn get_all_with_pagination(&self, request: &PageRequest) -> Result<Page<E>> {
        self.pagination_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.inner.get_all_with_pagination(request).await
    }

    async fn update(&self, entity: &E) -> Result<()> {
        self.inner.update(entity).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }

    fn natural_key_lookup(&self) -> Option<&dyn NaturalKeyLookup<E>> {
        if self.has_finder() {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl<E: Entity> NaturalKeyLookup<E> for CountingRepository<E> {
    async fn find_by_natural_key(&self, field: &str, value: &str) -> Result<Option<E>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        match self.inner.natural_key_lookup() {
            Some(finder) => finder.find_by_natural_key(field, value).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ArticleSearch for CountingRepository<Article> {
    async fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        self.inner.search_articles(query).await
    }
}

/// Cache whose every operation fails, as if the backend were unreachable.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::ConnectionFailed("cache unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("cache unavailable".into()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("cache unavailable".into()))
    }
}
