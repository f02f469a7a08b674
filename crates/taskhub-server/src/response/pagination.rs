//! Pagination support for list endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Current page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of matching items.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(u64::from(limit)),
        }
    }
}

/// Pagination request parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "Page must be a positive integer"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Get the offset for store queries.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit())
    }

    /// Get the limit, capped at maximum.
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Metadata for a page of this request.
    pub fn meta(&self, total: u64) -> PageMeta {
        PageMeta::new(self.page, self.limit(), total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageMeta::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageMeta::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageMeta::new(1, 10, 11).total_pages, 2);
    }

    #[test]
    fn test_offset() {
        let params = PaginationParams { page: 3, limit: 20 };
        assert_eq!(params.offset(), 40);
        assert_eq!(PaginationParams::default().offset(), 0);
    }

    #[test]
    fn test_range_validation() {
        assert!(PaginationParams { page: 0, limit: 10 }.validate().is_err());
        assert!(PaginationParams { page: 1, limit: 101 }.validate().is_err());
        assert!(PaginationParams { page: 1, limit: 100 }.validate().is_ok());
    }

    proptest::proptest! {
        #[test]
        fn test_pages_cover_total(page in 1u32..1000, limit in 1u32..=100, total in 0u64..100_000) {
            let meta = PaginationParams { page, limit }.meta(total);
            proptest::prop_assert!(meta.total_pages * u64::from(meta.limit) >= total);
            proptest::prop_assert!(meta.total_pages.saturating_sub(1) * u64::from(meta.limit) < total.max(1));
        }
    }

    #[test]
    fn test_meta_serializes_camel_case() {
        let json = serde_json::to_value(PageMeta::new(2, 5, 12)).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["limit"], 5);
    }
}
