//! System-wide aggregate counts for the admin dashboard.

use serde::Serialize;
use sqlx::FromRow;

/// Row counts across the whole system. Soft-deleted rows are excluded.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SystemStats {
    pub user_count: i64,
    pub note_model_count: i64,
    pub shared_deck_count: i64,
    pub active_shared_deck_count: i64,
    pub total_downloads: i64,
}
