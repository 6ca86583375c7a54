//! Generic cached repository decorator.
//!
//! Wraps any [`Repository`] with the cache-aside pattern:
//! - **Reads**: check cache first, on miss fetch from repository and populate cache
//! - **Writes**: persist to repository, then invalidate the affected keys
//!
//! Only repository errors reach the caller. Cache failures degrade to misses
//! on reads and are logged on writes.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use refcache_core::cache::{
    collection_key, entity_key, natural_key, natural_keys_of, Cache, CacheStats,
};
use refcache_core::entities::Entity;
use refcache_core::storage::{NaturalKeyLookup, Page, PageRequest, Repository, Result};

use super::aside::CacheAside;
use super::policy::{CachePolicy, CachedEntity};
use crate::manager::{WarmReport, Warmable};

/// Cached repository decorator for entity type `E`.
///
/// # Type Parameters
///
/// * `E` - The entity type
/// * `R` - The underlying repository implementation
/// * `C` - The cache implementation (may be `dyn Cache`)
pub struct CachedRepository<E, R, C>
where
    E: Entity,
    R: Repository<E>,
    C: Cache + ?Sized,
{
    pub(super) repository: Arc<R>,
    pub(super) aside: CacheAside<C>,
    pub(super) policy: CachePolicy,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R, C> CachedRepository<E, R, C>
where
    E: Entity,
    R: Repository<E>,
    C: Cache + ?Sized,
{
    /// Creates a new cached repository with its own statistics.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - The cache implementation
    /// * `policy` - TTLs for each key family
    pub fn new(repository: Arc<R>, cache: Arc<C>, policy: CachePolicy) -> Self {
        Self {
            repository,
            aside: CacheAside::new(cache, Arc::new(CacheStats::new())),
            policy,
            _entity: PhantomData,
        }
    }

    /// Reports into a shared statistics sink instead of a private one.
    pub fn with_stats(mut self, stats: Arc<CacheStats>) -> Self {
        self.aside.set_stats(stats);
        self
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn stats(&self) -> &Arc<CacheStats> {
        self.aside.stats()
    }

    /// Persists a new entity and drops the cached collection.
    ///
    /// The new entity's own keys are filled lazily on the next read.
    pub async fn create(&self, entity: &E) -> Result<()> {
        self.repository.create(entity).await?;

        let outcome = self.aside.invalidate(&[collection_key::<E>()]).await;
        tracing::debug!(
            entity = E::KIND,
            id = entity.id(),
            cache_applied = outcome.is_applied(),
            "Entity created"
        );
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        let cache_key = entity_key::<E>(id);

        if let Some(entity) = self.aside.read::<E>(&cache_key).await {
            return Ok(Some(entity));
        }

        let entity = self.repository.get_by_id(id).await?.map(E::redacted);

        // Not-found is never cached
        if let Some(ref e) = entity {
            let _ = self.aside.store(&cache_key, e, self.policy.entity_ttl).await;
        }

        Ok(entity)
    }

    pub async fn get_all(&self) -> Result<Vec<E>> {
        let cache_key = collection_key::<E>();

        if let Some(entities) = self.aside.read::<Vec<E>>(&cache_key).await {
            return Ok(entities);
        }

        let entities: Vec<E> = self
            .repository
            .get_all()
            .await?
            .into_iter()
            .map(E::redacted)
            .collect();
        let _ = self
            .aside
            .store(&cache_key, &entities, self.policy.collection_ttl)
            .await;

        Ok(entities)
    }

    /// Looks an entity up by one of its natural keys (`code`, `username`).
    pub async fn get_by_natural_key(&self, field: &str, value: &str) -> Result<Option<E>> {
        let cache_key = natural_key::<E>(field, value);

        if let Some(entity) = self.aside.read::<E>(&cache_key).await {
            return Ok(Some(entity));
        }

        let entity = self.find_in_source(field, value).await?.map(E::redacted);

        if let Some(ref e) = entity {
            let _ = self.aside.store(&cache_key, e, self.policy.entity_ttl).await;
        }

        Ok(entity)
    }

    /// Natural-key lookup against the source of truth only. The result is
    /// not redacted.
    ///
    /// Uses the repository's dedicated finder when it has one. Otherwise the
    /// full collection is fetched and scanned, which is only reasonable for
    /// small reference tables.
    pub(super) async fn find_in_source(&self, field: &str, value: &str) -> Result<Option<E>> {
        match self.repository.natural_key_lookup() {
            Some(finder) => finder.find_by_natural_key(field, value).await,
            None => {
                tracing::trace!(entity = E::KIND, field, "No finder, scanning collection");
                let entities = self.repository.get_all().await?;
                Ok(entities
                    .into_iter()
                    .find(|e| e.natural_key(field).as_deref() == Some(value)))
            }
        }
    }

    /// Persists the update and invalidates primary, secondary and collection keys.
    ///
    /// The previous row is read first so that secondary keys of a changed
    /// natural key are dropped too, and so that secret fields left empty by a
    /// redacted read are carried over. If that read fails the update still
    /// proceeds and the old secondary entry lives until its TTL.
    pub async fn update(&self, entity: &E) -> Result<()> {
        let previous = match self.repository.get_by_id(entity.id()).await {
            Ok(previous) => previous,
            Err(err) => {
                tracing::warn!(
                    entity = E::KIND,
                    id = entity.id(),
                    error = %err,
                    "Could not read previous natural keys before update"
                );
                None
            }
        };

        let mut entity = entity.clone();
        if let Some(stored) = &previous {
            entity.retain_secrets(stored);
        }
        self.repository.update(&entity).await?;

        let keys = invalidation_keys(entity.id(), Some(&entity), previous.as_ref());
        let outcome = self.aside.invalidate(&keys).await;
        tracing::debug!(
            entity = E::KIND,
            id = entity.id(),
            cache_applied = outcome.is_applied(),
            "Entity updated"
        );
        Ok(())
    }

    /// Deletes the entity and invalidates every key that referred to it.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let existing = match self.repository.get_by_id(id).await {
            Ok(existing) => existing,
            Err(err) => {
                tracing::warn!(
                    entity = E::KIND,
                    id,
                    error = %err,
                    "Could not read natural keys before delete"
                );
                None
            }
        };

        self.repository.delete(id).await?;

        let keys = invalidation_keys::<E>(id, existing.as_ref(), None);
        let outcome = self.aside.invalidate(&keys).await;
        tracing::debug!(
            entity = E::KIND,
            id,
            cache_applied = outcome.is_applied(),
            "Entity deleted"
        );
        Ok(())
    }

    /// Paginated listing. Never reads from or writes to the cache.
    pub async fn get_all_with_pagination(&self, request: &PageRequest) -> Result<Page<E>> {
        self.aside.stats().record_bypass();
        let page = self.repository.get_all_with_pagination(request).await?;
        Ok(Page {
            items: page.items.into_iter().map(E::redacted).collect(),
            ..page
        })
    }


    /// Fetches the collection once, caches it, then caches up to `limit`
    /// individual entities (primary and secondary keys) from the same fetch.
    pub async fn warm(&self, limit: usize) -> Result<WarmReport> {
        let entities = self.repository.get_all().await?;
        let mut report = WarmReport::new(E::COLLECTION, entities.len());

        report.record(
            self.aside
                .store(&collection_key::<E>(), &entities, self.policy.collection_ttl)
                .await,
        );

        for entity in entities.iter().take(limit) {
            report.record(
                self.aside
                    .store(&entity_key::<E>(entity.id()), entity, self.policy.entity_ttl)
                    .await,
            );
            for key in natural_keys_of(entity) {
                report.record(self.aside.store(&key, entity, self.policy.entity_ttl).await);
            }
        }

        tracing::debug!(
            entity = E::COLLECTION,
            fetched = report.fetched,
            written = report.entries_written,
            failed = report.write_failures,
            "Cache warmed"
        );
        Ok(report)
    }
}

impl<E, R, C> CachedRepository<E, R, C>
where
    E: CachedEntity,
    R: Repository<E>,
    C: Cache + ?Sized,
{
    /// Creates a cached repository using the entity's default policy.
    pub fn with_default_policy(repository: Arc<R>, cache: Arc<C>, base_ttl: Duration) -> Self {
        Self::new(repository, cache, E::default_policy(base_ttl))
    }
}

/// Keys to drop after a write: primary, every secondary key of the new and
/// previous versions, then the collection.
fn invalidation_keys<E: Entity>(
    id: &str,
    current: Option<&E>,
    previous: Option<&E>,
) -> Vec<String> {
    let mut keys = vec![entity_key::<E>(id)];
    for entity in current.into_iter().chain(previous) {
        for key in natural_keys_of(entity) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys.push(collection_key::<E>());
    keys
}

#[async_trait]
impl<E, R, C> Repository<E> for CachedRepository<E, R, C>
where
    E: Entity,
    R: Repository<E> + 'static,
    C: Cache + ?Sized + 'static,
{
    async fn create(&self, entity: &E) -> Result<()> {
        CachedRepository::create(self, entity).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        CachedRepository::get_by_id(self, id).await
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        CachedRepository::get_all(self).await
    }

    async fn get_all_with_pagination(&self, request: &PageRequest) -> Result<Page<E>> {
        CachedRepository::get_all_with_pagination(self, request).await
    }

    async fn update(&self, entity: &E) -> Result<()> {
        CachedRepository::update(self, entity).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        CachedRepository::delete(self, id).await
    }

    fn natural_key_lookup(&self) -> Option<&dyn NaturalKeyLookup<E>> {
        Some(self)
    }
}

#[async_trait]
impl<E, R, C> NaturalKeyLookup<E> for CachedRepository<E, R, C>
where
    E: Entity,
    R: Repository<E> + 'static,
    C: Cache + ?Sized + 'static,
{
    /// Callers holding only the generic finder may be authenticating, so
    /// lookups of secret-bearing entities bypass the cache and return the
    /// full row.
    async fn find_by_natural_key(&self, field: &str, value: &str) -> Result<Option<E>> {
        if !E::CARRIES_SECRETS {
            return self.get_by_natural_key(field, value).await;
        }
        self.aside.stats().record_bypass();
        tracing::trace!(entity = E::KIND, field, "Credential lookup bypasses cache");
        self.find_in_source(field, value).await
    }
}

#[async_trait]
impl<E, R, C> Warmable for CachedRepository<E, R, C>
where
    E: Entity,
    R: Repository<E> + 'static,
    C: Cache + ?Sized + 'static,
{
    fn entity(&self) -> &'static str {
        E::COLLECTION
    }

    async fn warm(&self, limit: usize) -> Result<WarmReport> {
        CachedRepository::warm(self, limit).await
    }
}
