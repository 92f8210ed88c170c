//! Pagination over the currency catalog.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 12;
pub const MAX_LIMIT: u32 = 100;

/// A validated page window request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a page request, checking `page >= 1` and `1 <= limit <= 100`.
    pub fn new(page: u32, limit: u32) -> Result<Self, DomainError> {
        if page < 1 {
            return Err(DomainError::InvalidPage);
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DomainError::InvalidLimit);
        }
        Ok(Self { page, limit })
    }

    /// Parses raw query-string values. Missing values take the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, DomainError> {
        let page = match page {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| DomainError::InvalidPage)?,
            None => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| DomainError::InvalidLimit)?,
            None => DEFAULT_LIMIT,
        };
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// `(page - 1) * limit`, which cannot overflow `u64` for `u32` inputs.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned alongside a page of rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    /// The requested page (1-based)
    #[schema(example = 1)]
    pub current_page: u32,
    /// Page size
    #[schema(example = 12)]
    pub per_page: u32,
    /// Number of currencies in the catalog
    #[schema(example = 30)]
    pub total: u64,
    /// Whether a further page exists
    pub has_more: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let end = request.offset() + u64::from(request.limit());
        Self {
            current_page: request.page(),
            per_page: request.limit(),
            total,
            has_more: end < total,
        }
    }
}
