//! Cache-aside layer over the ERP master-data repositories.
//!
//! [`storage::cached`] wraps each base repository so reads are served from an
//! expiring key/value [`Cache`](refcache_core::cache::Cache) and writes
//! invalidate what they touch. [`manager::CacheManager`] warms and busts the
//! caches in bulk.

pub mod cache;
pub mod config;
pub mod manager;
pub mod mock_data;
pub mod state;
pub mod storage;
