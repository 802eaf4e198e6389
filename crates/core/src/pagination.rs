//! Pagination rules for record listing.
//!
//! Pages are 1-indexed. The page size is caller-supplied but clamped to a
//! hard ceiling so a single request cannot drag the whole table across the
//! wire.

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of records per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a 1-indexed page number. Zero or negative values become page 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a caller-supplied page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Offset into the result set for a clamped page / page size.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1) * page_size
}

/// Total number of pages for a result count. Zero rows still report one page
/// so clients can render an empty first page.
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total == 0 {
        return 1;
    }
    (total + page_size - 1) / page_size
}
