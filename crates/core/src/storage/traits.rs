use async_trait::async_trait;

use crate::entities::{Article, Entity};

use super::{Page, PageRequest, Result};

/// Generic CRUD contract of a master-data repository.
///
/// `get_by_id` returns `Ok(None)` when the row does not exist.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Creates a new entity.
    async fn create(&self, entity: &E) -> Result<()>;

    /// Gets an entity by its ID.
    async fn get_by_id(&self, id: &str) -> Result<Option<E>>;

    /// Gets every entity of this type.
    async fn get_all(&self) -> Result<Vec<E>>;

    /// Gets one page of entities, optionally filtered.
    async fn get_all_with_pagination(&self, request: &PageRequest) -> Result<Page<E>>;

    /// Updates an existing entity.
    async fn update(&self, entity: &E) -> Result<()>;

    /// Deletes an entity by its ID.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Returns the dedicated natural-key finder, if this backend has one.
    ///
    /// Callers without a finder fall back to scanning [`Repository::get_all`].
    fn natural_key_lookup(&self) -> Option<&dyn NaturalKeyLookup<E>> {
        None
    }
}

/// Dedicated finder for natural-key lookups (`code`, `username`).
#[async_trait]
pub trait NaturalKeyLookup<E: Entity>: Send + Sync {
    async fn find_by_natural_key(&self, field: &str, value: &str) -> Result<Option<E>>;
}

/// Free-text search over articles.
#[async_trait]
pub trait ArticleSearch: Send + Sync {
    async fn search_articles(&self, query: &str) -> Result<Vec<Article>>;
}
