use serde::{Deserialize, Serialize};

use super::{RepositoryError, Result};

/// Upper bound on a single page, matching what the SQL layer accepts.
pub const MAX_PAGE_SIZE: usize = 500;

/// A page request with an optional free-text filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
    pub filter: Option<String>,
}

impl PageRequest {
    /// Creates a page request, validating that `1 <= limit <= MAX_PAGE_SIZE`.
    pub fn new(limit: usize, offset: usize) -> Result<Self> {
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(RepositoryError::InvalidData(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, limit
            )));
        }
        Ok(Self {
            limit,
            offset,
            filter: None,
        })
    }

    /// Restricts the page to entities matching `filter`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter)
        };
        self
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    /// Returns true if rows exist past this page.
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}
