//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Pagination metadata returned alongside every record listing.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// 1-indexed page number after clamping.
    pub page: i64,
    /// Effective page size after clamping.
    pub limit: i64,
    /// Total number of rows matching the filter.
    pub total: i64,
    pub total_pages: i64,
}

/// Standard `{ "data": [...], "pagination": {...} }` envelope for paginated
/// listings.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, page: i64, limit: i64, total: i64) -> Self {
        Paginated {
            data,
            pagination: PaginationMeta {
                page,
                limit,
                total,
                total_pages: suivi_core::pagination::total_pages(total, limit),
            },
        }
    }
}
