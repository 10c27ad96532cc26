//! Page parameters and pagination metadata for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a client may request
pub const MAX_PAGE_LIMIT: u32 = 500;

/// A resolved page request (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// Resolve optional query values, falling back to page 1 and `default_limit`.
    ///
    /// Page numbers below 1 become 1; limits are clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn resolve(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Number of records to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// `?page=&limit=` query parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn resolve(self, default_limit: u32) -> Page {
        Page::resolve(self.page, self.limit, default_limit)
    }
}

/// Pagination block of list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: Page, total: u64) -> Self {
        Self {
            page: page.page,
            limit: page.limit,
            total,
            pages: total.div_ceil(u64::from(page.limit)),
        }
    }
}
