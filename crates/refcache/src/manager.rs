//! Cache warm-up and bulk invalidation across every cached repository.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use refcache_core::cache::{all_collection_keys, Cache, CacheError, CacheWrite};
use refcache_core::storage::{RepositoryError, Result};

/// A cached repository that can pre-populate its cache.
#[async_trait]
pub trait Warmable: Send + Sync {
    /// Collection name, used in logs and reports.
    fn entity(&self) -> &'static str;

    /// Fetches the collection once and caches it together with up to
    /// `limit` individual entries.
    async fn warm(&self, limit: usize) -> Result<WarmReport>;
}

/// Outcome of one repository's warm step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmReport {
    pub entity: &'static str,
    /// Rows returned by the base repository.
    pub fetched: usize,
    pub entries_written: usize,
    pub write_failures: usize,
}

impl WarmReport {
    pub fn new(entity: &'static str, fetched: usize) -> Self {
        Self {
            entity,
            fetched,
            entries_written: 0,
            write_failures: 0,
        }
    }

    /// Counts one cache write of the warm step.
    pub(crate) fn record(&mut self, outcome: CacheWrite) {
        match outcome {
            CacheWrite::Applied => self.entries_written += 1,
            CacheWrite::Degraded(_) => self.write_failures += 1,
        }
    }
}

/// A warm step that failed because the base repository did.
#[derive(Debug)]
pub struct WarmFailure {
    pub entity: &'static str,
    pub error: RepositoryError,
}

#[derive(Debug, Default)]
pub struct WarmSummary {
    pub reports: Vec<WarmReport>,
    pub failures: Vec<WarmFailure>,
}

impl WarmSummary {
    /// True when every step reached the base repository and every cache
    /// write succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.reports.iter().all(|r| r.write_failures == 0)
    }

    pub fn entries_written(&self) -> usize {
        self.reports.iter().map(|r| r.entries_written).sum()
    }
}

#[derive(Debug, Default)]
pub struct InvalidationSummary {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, CacheError)>,
}

impl InvalidationSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The repositories the manager warms, one per entity.
///
/// Field order is warm order: small, heavily referenced tables first and the
/// article table last. Users are never warmed.
#[derive(Clone)]
pub struct WarmTargets {
    pub classifications: Arc<dyn Warmable>,
    pub companies: Arc<dyn Warmable>,
    pub colors: Arc<dyn Warmable>,
    pub divisions: Arc<dyn Warmable>,
    pub depstores: Arc<dyn Warmable>,
    pub customers: Arc<dyn Warmable>,
    pub articles: Arc<dyn Warmable>,
}

impl WarmTargets {
    fn all(&self) -> [&Arc<dyn Warmable>; 7] {
        [
            &self.classifications,
            &self.companies,
            &self.colors,
            &self.divisions,
            &self.depstores,
            &self.customers,
            &self.articles,
        ]
    }

    fn frequently_accessed(&self) -> [&Arc<dyn Warmable>; 3] {
        [&self.classifications, &self.colors, &self.divisions]
    }
}

/// Orchestrates warm-up and administrative invalidation.
pub struct CacheManager<C: Cache + ?Sized> {
    targets: WarmTargets,
    cache: Arc<C>,
    warm_limit: usize,
}

impl<C: Cache + ?Sized> CacheManager<C> {
    pub fn new(targets: WarmTargets, cache: Arc<C>, warm_limit: usize) -> Self {
        Self {
            targets,
            cache,
            warm_limit,
        }
    }

    pub fn warm_limit(&self) -> usize {
        self.warm_limit
    }

    /// Warms every repository in priority order.
    ///
    /// A failing step is logged and recorded; the remaining steps still run.
    pub async fn warm_all_caches(&self) -> WarmSummary {
        tracing::info!("Starting cache warm-up");
        let summary = self.warm(&self.targets.all()).await;
        tracing::info!(
            warmed = summary.reports.len(),
            failed = summary.failures.len(),
            entries = summary.entries_written(),
            "Cache warm-up finished"
        );
        summary
    }

    /// Refreshes only the smallest, hottest reference tables.
    pub async fn warm_frequently_accessed_data(&self) -> WarmSummary {
        let summary = self.warm(&self.targets.frequently_accessed()).await;
        tracing::debug!(
            warmed = summary.reports.len(),
            failed = summary.failures.len(),
            "Refreshed frequently accessed data"
        );
        summary
    }

    async fn warm(&self, targets: &[&Arc<dyn Warmable>]) -> WarmSummary {
        let mut summary = WarmSummary::default();

        for target in targets {
            let started = Instant::now();
            match target.warm(self.warm_limit).await {
                Ok(report) => {
                    tracing::debug!(
                        entity = report.entity,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Warm step done"
                    );
                    summary.reports.push(report);
                }
                Err(error) => {
                    tracing::warn!(entity = target.entity(), error = %error, "Warm step failed");
                    summary.failures.push(WarmFailure {
                        entity: target.entity(),
                        error,
                    });
                }
            }
        }

        summary
    }

    /// Deletes the collection key of every entity type.
    ///
    /// Individual entries are left to expire.
    pub async fn invalidate_all_caches(&self) -> InvalidationSummary {
        let mut summary = InvalidationSummary::default();

        for key in all_collection_keys() {
            match self.cache.delete(&key).await {
                Ok(()) => summary.deleted.push(key),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "Failed to invalidate collection");
                    summary.failed.push((key, err));
                }
            }
        }

        tracing::info!(
            deleted = summary.deleted.len(),
            failed = summary.failed.len(),
            "Invalidated all collection caches"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::cached::CachedRepository;
    use crate::storage::inmemory::InMemoryRepository;
    use refcache_core::entities::{Color, Company};
    use refcache_core::storage::Repository;

    /// Records the order in which it was warmed.
    struct Recorder {
        entity: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        fail: bool,
    }

    #[async_trait]
    impl Warmable for Recorder {
        fn entity(&self) -> &'static str {
            self.entity
        }

        async fn warm(&self, limit: usize) -> Result<WarmReport> {
            self.log.lock().unwrap().push(self.entity);
            if self.fail {
                return Err(RepositoryError::ConnectionFailed("database offline".into()));
            }
            let mut report = WarmReport::new(self.entity, limit);
            report.entries_written = limit;
            Ok(report)
        }
    }

    fn recorders(failing: &[&'static str]) -> (WarmTargets, Arc<Mutex<Vec<&'static str>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorder = |entity: &'static str| -> Arc<dyn Warmable> {
            Arc::new(Recorder {
                entity,
                log: log.clone(),
                fail: failing.contains(&entity),
            })
        };
        let targets = WarmTargets {
            classifications: recorder("classifications"),
            companies: recorder("companies"),
            colors: recorder("colors"),
            divisions: recorder("divisions"),
            depstores: recorder("depstores"),
            customers: recorder("customers"),
            articles: recorder("articles"),
        };
        (targets, log)
    }

    #[tokio::test]
    async fn test_warm_all_in_priority_order() {
        let (targets, log) = recorders(&[]);
        let manager = CacheManager::new(targets, Arc::new(MemoryCache::new()), 3);

        let summary = manager.warm_all_caches().await;

        assert!(summary.is_complete());
        assert_eq!(summary.entries_written(), 21);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "classifications",
                "companies",
                "colors",
                "divisions",
                "depstores",
                "customers",
                "articles",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_step_does_not_abort_warm_up() {
        let (targets, log) = recorders(&["companies", "customers"]);
        let manager = CacheManager::new(targets, Arc::new(MemoryCache::new()), 1);

        let summary = manager.warm_all_caches().await;

        assert!(!summary.is_complete());
        assert_eq!(summary.reports.len(), 5);
        let failed: Vec<_> = summary.failures.iter().map(|f| f.entity).collect();
        assert_eq!(failed, vec!["companies", "customers"]);
        // Articles still ran after the failures
        assert_eq!(log.lock().unwrap().last(), Some(&"articles"));
    }

    #[tokio::test]
    async fn test_frequently_accessed_subset() {
        let (targets, log) = recorders(&[]);
        let manager = CacheManager::new(targets, Arc::new(MemoryCache::new()), 1);

        let summary = manager.warm_frequently_accessed_data().await;

        assert_eq!(summary.reports.len(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["classifications", "colors", "divisions"]
        );
    }

    #[tokio::test]
    async fn test_invalidate_all_drops_collections_only() {
        let cache = Arc::new(MemoryCache::new());
        let ttl = Duration::from_secs(60);
        for key in all_collection_keys() {
            cache.set(&key, b"[]", ttl).await.unwrap();
        }
        cache.set("color:001", b"{}", ttl).await.unwrap();

        let (targets, _log) = recorders(&[]);
        let manager = CacheManager::new(targets, cache.clone(), 1);
        let summary = manager.invalidate_all_caches().await;

        assert!(summary.is_complete());
        assert_eq!(summary.deleted.len(), 8);
        assert!(summary.deleted.contains(&"users:all".to_string()));
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("color:001").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_warm_real_repositories() {
        let cache = Arc::new(MemoryCache::new());
        let ttl = Duration::from_secs(60);

        let colors = Arc::new(InMemoryRepository::new());
        colors
            .seed([
                Color::new("RED", "Red").with_id("001"),
                Color::new("BLUE", "Blue").with_id("002"),
            ])
            .await
            .unwrap();
        let companies = Arc::new(InMemoryRepository::new());
        companies
            .create(&Company::new("ACME", "Acme", "21-1").with_id("co-1"))
            .await
            .unwrap();

        let (mut targets, _log) = recorders(&[]);
        targets.colors =
            Arc::new(CachedRepository::with_default_policy(colors, cache.clone(), ttl));
        targets.companies =
            Arc::new(CachedRepository::with_default_policy(companies, cache.clone(), ttl));

        let manager = CacheManager::new(targets, cache.clone(), 100);
        let summary = manager.warm_all_caches().await;

        let colors_report = summary
            .reports
            .iter()
            .find(|r| r.entity == "colors")
            .unwrap();
        assert_eq!(colors_report.fetched, 2);
        // collection + 2 x (primary + code)
        assert_eq!(colors_report.entries_written, 5);
        assert!(cache.get("color:code:BLUE").await.unwrap().is_some());
        assert!(cache.get("company:co-1").await.unwrap().is_some());
    }
}
