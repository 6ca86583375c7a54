//! Redis cache backend implementation.
//!
//! Provides a networked cache for multi-instance deployments.

mod cache;
mod error;

pub use cache::RedisCache;
