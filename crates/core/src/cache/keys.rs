use crate::entities::{
    Article, Classification, Color, Company, Customer, Depstore, Division, Entity, User,
};

/// Returns the primary cache key for a single entity (`color:001`).
pub fn entity_key<E: Entity>(id: &str) -> String {
    format!("{}:{}", E::KIND, id)
}

/// Returns the secondary cache key for a natural-key lookup (`color:code:RED`).
pub fn natural_key<E: Entity>(field: &str, value: &str) -> String {
    format!("{}:{}:{}", E::KIND, field, value)
}

/// Returns the cache key for the full collection of an entity type (`colors:all`).
pub fn collection_key<E: Entity>() -> String {
    format!("{}:all", E::COLLECTION)
}

/// Returns every secondary key derivable from an entity's natural keys.
pub fn natural_keys_of<E: Entity>(entity: &E) -> Vec<String> {
    entity
        .natural_keys()
        .iter()
        .map(|key| natural_key::<E>(key.field, &key.value))
        .collect()
}

/// Normalizes a free-text article query for use in a cache key.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Returns the cache key for an article search (`article:search:<query>`).
///
/// Search keys are never invalidated individually and rely on TTL expiry.
pub fn article_search_key(query: &str) -> String {
    format!("{}:search:{}", Article::KIND, normalize_query(query))
}

/// Returns the collection keys of every cached entity type.
pub fn all_collection_keys() -> Vec<String> {
    vec![
        collection_key::<Classification>(),
        collection_key::<Company>(),
        collection_key::<Color>(),
        collection_key::<Division>(),
        collection_key::<Depstore>(),
        collection_key::<Customer>(),
        collection_key::<Article>(),
        collection_key::<User>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_key() {
        assert_eq!(entity_key::<Color>("001"), "color:001");
        assert_eq!(entity_key::<Depstore>("42"), "depstore:42");
    }

    #[test]
    fn test_natural_key() {
        assert_eq!(natural_key::<Color>("code", "RED"), "color:code:RED");
        assert_eq!(natural_key::<User>("username", "alice"), "user:username:alice");
    }

    #[test]
    fn test_collection_key_uses_plural() {
        assert_eq!(collection_key::<Company>(), "companies:all");
        assert_eq!(collection_key::<Classification>(), "classifications:all");
        assert_eq!(collection_key::<Article>(), "articles:all");
    }

    #[test]
    fn test_natural_keys_of() {
        let color = Color::new("RED", "Red").with_id("001");
        assert_eq!(natural_keys_of(&color), vec!["color:code:RED".to_string()]);
    }

    #[test]
    fn test_article_search_key_is_normalized() {
        assert_eq!(article_search_key("  Shirt "), "article:search:shirt");
        assert_eq!(article_search_key("SHIRT"), article_search_key("shirt"));
    }

    #[test]
    fn test_all_collection_keys_are_distinct() {
        let keys = all_collection_keys();
        let mut deduped = keys.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(keys.len(), 8);
        assert_eq!(deduped.len(), keys.len());
    }
}
