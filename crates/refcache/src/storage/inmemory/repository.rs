//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use refcache_core::entities::{Article, Entity};
use refcache_core::storage::{
    ArticleSearch, NaturalKeyLookup, Page, PageRequest, Repository, RepositoryError, Result,
};

/// In-memory storage backend for one entity type.
///
/// Rows live in a `BTreeMap` keyed by id, so `get_all` and pagination return
/// rows in a stable order. Natural keys are unique, like the `UNIQUE`
/// constraints of the SQL schema.
///
/// The dedicated natural-key finder is only advertised when built with
/// [`InMemoryRepository::with_indexed_lookup`]; otherwise callers fall back
/// to scanning the full collection.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<E: Entity> {
    rows: Arc<RwLock<BTreeMap<String, E>>>,
    indexed_lookup: bool,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    /// Creates a new empty repository without a natural-key finder.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            indexed_lookup: false,
        }
    }

    /// Creates a new empty repository that exposes a natural-key finder.
    pub fn with_indexed_lookup() -> Self {
        Self {
            indexed_lookup: true,
            ..Self::new()
        }
    }

    /// Inserts `entities`, failing on the first conflict.
    pub async fn seed(&self, entities: impl IntoIterator<Item = E>) -> Result<()> {
        for entity in entities {
            self.create(&entity).await?;
        }
        Ok(())
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

/// Returns an error if another row already uses one of `entity`'s natural keys.
fn check_natural_keys<E: Entity>(rows: &BTreeMap<String, E>, entity: &E) -> Result<()> {
    for key in entity.natural_keys() {
        let taken = rows
            .values()
            .filter(|row| row.id() != entity.id())
            .any(|row| row.natural_key(key.field).as_deref() == Some(key.value.as_str()));
        if taken {
            return Err(RepositoryError::AlreadyExists {
                entity_type: E::KIND,
                id: format!("{}={}", key.field, key.value),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn create(&self, entity: &E) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(entity.id()) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: E::KIND,
                id: entity.id().to_string(),
            });
        }
        check_natural_keys(&rows, entity)?;
        rows.insert(entity.id().to_string(), entity.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<E>> {
        let rows = self.rows.read().await;
        Ok(rows.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<E>> {
        let rows = self.rows.read().await;
        Ok(rows.values().cloned().collect())
    }

    async fn get_all_with_pagination(&self, request: &PageRequest) -> Result<Page<E>> {
        let rows = self.rows.read().await;
        let matching: Vec<&E> = rows
            .values()
            .filter(|row| match &request.filter {
                Some(filter) => row.matches(filter),
                None => true,
            })
            .collect();

        Ok(Page {
            total: matching.len(),
            items: matching
                .into_iter()
                .skip(request.offset)
                .take(request.limit)
                .cloned()
                .collect(),
            limit: request.limit,
            offset: request.offset,
        })
    }

    async fn update(&self, entity: &E) -> Result<()> {
        let mut rows = self.rows.write().await;
        let Some(stored) = rows.get(entity.id()) else {
            return Err(RepositoryError::NotFound {
                entity_type: E::KIND,
                id: entity.id().to_string(),
            });
        };
        let mut entity = entity.clone();
        entity.retain_secrets(stored);
        check_natural_keys(&rows, &entity)?;
        rows.insert(entity.id().to_string(), entity);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut rows = self.rows.write().await;
        if rows.remove(id).is_none() {
            return Err(RepositoryError::NotFound {
                entity_type: E::KIND,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn natural_key_lookup(&self) -> Option<&dyn NaturalKeyLookup<E>> {
        if self.indexed_lookup {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl<E: Entity> NaturalKeyLookup<E> for InMemoryRepository<E> {
    async fn find_by_natural_key(&self, field: &str, value: &str) -> Result<Option<E>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .find(|row| row.natural_key(field).as_deref() == Some(value))
            .cloned())
    }
}

#[async_trait]
impl ArticleSearch for InMemoryRepository<Article> {
    async fn search_articles(&self, query: &str) -> Result<Vec<Article>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|article| article.active && article.matches(query))
            .cloned()
            .collect())
    }
}
