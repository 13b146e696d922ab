//! Page-based pagination shared by all list operations.

use serde::{Deserialize, Serialize};

/// Page size used when the caller supplies none.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// A requested page. Raw values come straight from the query string and are
/// normalized by [`PageRequest::normalized`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: i64,
    /// Maximum number of items per page.
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Creates a page request from raw caller input.
    #[must_use]
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Returns a request with `page >= 1` and `1 <= limit <= MAX_LIMIT`,
    /// substituting `default_limit` for a non-positive limit.
    #[must_use]
    pub fn normalized(self, default_limit: i64) -> Self {
        let page = if self.page <= 0 { 1 } else { self.page };
        let limit = if self.limit <= 0 {
            default_limit
        } else {
            self.limit
        };
        Self {
            page,
            limit: limit.min(MAX_LIMIT),
        }
    }

    /// Number of rows to skip. Saturates at `i64::MAX` for page numbers
    /// far beyond any real result set.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit.max(0))
    }
}

/// One page of results together with the overall count.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: i64,
    /// The page number that was returned.
    pub page: i64,
    /// The page size that was applied.
    pub limit: i64,
    /// Number of pages needed to cover `total`.
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    /// Builds a page from a normalized request.
    #[must_use]
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let total_pages = if request.limit > 0 {
            (total + request.limit - 1) / request.limit
        } else {
            0
        };
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }
}
