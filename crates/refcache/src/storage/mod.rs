//! Storage layer: in-memory base repositories and their cached decorators.

pub mod cached;
pub mod inmemory;
