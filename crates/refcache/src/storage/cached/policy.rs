use std::time::Duration;

use refcache_core::entities::Entity;

/// TTLs applied by a cached repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// TTL of primary and secondary (natural-key) entries.
    pub entity_ttl: Duration,
    /// TTL of the `<collection>:all` entry.
    pub collection_ttl: Duration,
    /// TTL of search result entries, which are never invalidated on write.
    pub search_ttl: Duration,
}

impl CachePolicy {
    /// Same TTL for every key family.
    pub fn standard(ttl: Duration) -> Self {
        Self {
            entity_ttl: ttl,
            collection_ttl: ttl,
            search_ttl: ttl,
        }
    }

    /// Slow-changing reference data: the collection lives twice as long.
    pub fn reference(ttl: Duration) -> Self {
        Self {
            collection_ttl: ttl.saturating_mul(2),
            ..Self::standard(ttl)
        }
    }

    pub fn with_search_ttl(mut self, ttl: Duration) -> Self {
        self.search_ttl = ttl;
        self
    }
}

/// An entity with a default cache policy derived from the base TTL.
pub trait CachedEntity: Entity {
    fn default_policy(base_ttl: Duration) -> CachePolicy;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_doubles_collection_ttl() {
        let policy = CachePolicy::reference(Duration::from_secs(900));
        assert_eq!(policy.entity_ttl, Duration::from_secs(900));
        assert_eq!(policy.collection_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_standard_is_uniform() {
        let policy = CachePolicy::standard(Duration::from_secs(60))
            .with_search_ttl(Duration::from_secs(20));
        assert_eq!(policy.entity_ttl, policy.collection_ttl);
        assert_eq!(policy.search_ttl, Duration::from_secs(20));
    }
}
