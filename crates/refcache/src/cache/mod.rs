//! Cache backend implementations.
//!
//! This module provides concrete implementations of the [`Cache`] trait
//! defined in `refcache_core::cache`.
//!
//! # Feature Flags
//!
//! - `memory` (always available): process-local expiring map with a sweeper
//! - `redis`: Redis cache using the redis crate
//!
//! [`Cache`]: refcache_core::cache::Cache

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
