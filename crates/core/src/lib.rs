//! Domain types and contracts shared by the master-data cache layer.
//!
//! This crate is free of I/O: it defines the entities, the cache and
//! repository traits, and the key naming used by every cache backend.

pub mod cache;
pub mod entities;
pub mod storage;
