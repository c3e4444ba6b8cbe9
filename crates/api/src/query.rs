//! Shared query parameter types for API handlers.

use deckhub_core::search::{clamp_limit, clamp_offset};
use serde::Deserialize;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
/// Largest page a client may request.
pub const MAX_PAGE_LIMIT: i64 = 500;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` ready to bind.
    pub fn resolve(&self) -> (i64, i64) {
        page(self.limit, self.offset)
    }
}

/// Clamp raw paging values from any query struct.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
        clamp_offset(offset),
    )
}
