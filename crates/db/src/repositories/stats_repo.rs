//! Aggregate queries spanning several tables.

use sqlx::PgPool;

use crate::models::stats::SystemStats;

/// Provides read-only aggregate statistics.
pub struct StatsRepo;

impl StatsRepo {
    /// Count users, note models and marketplace listings in one round trip.
    pub async fn system(pool: &PgPool) -> Result<SystemStats, sqlx::Error> {
        let query = "\
            SELECT \
                (SELECT COUNT(*) FROM users) AS user_count, \
                (SELECT COUNT(*) FROM note_models WHERE deleted_at IS NULL) AS note_model_count, \
                COUNT(*) AS shared_deck_count, \
                COUNT(*) FILTER (WHERE is_active) AS active_shared_deck_count, \
                COALESCE(SUM(download_count), 0)::BIGINT AS total_downloads \
            FROM shared_decks \
            WHERE deleted_at IS NULL";
        sqlx::query_as::<_, SystemStats>(query).fetch_one(pool).await
    }
}
