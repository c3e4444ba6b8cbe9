//! Repository for the `review_logs` table.

use deckhub_core::review::RETAINED_MIN_RATING;
use deckhub_core::types::{DbId, EpochMillis};
use sqlx::{PgConnection, PgPool};

use crate::models::review_log::{NewReviewLog, ReviewLog, ReviewLogListParams, ReviewStats};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, card_id, review_time, rating, \
    prev_state, new_state, prev_interval, new_interval, prev_ease_factor, new_ease_factor, \
    prev_due, new_due, prev_stability, new_stability, prev_difficulty, new_difficulty, \
    duration_ms, created_at, updated_at";

/// Read access to review history. Entries are written only by
/// `CardRepo::apply_review`.
pub struct ReviewLogRepo;

impl ReviewLogRepo {
    /// Find a review log by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReviewLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM review_logs WHERE id = $1");
        sqlx::query_as::<_, ReviewLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's review logs, newest first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        params: &ReviewLogListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM review_logs
             WHERE user_id = $1
               AND ($2::BIGINT IS NULL OR card_id = $2)
               AND ($3::BIGINT IS NULL OR review_time >= $3)
               AND ($4::BIGINT IS NULL OR review_time < $4)
             ORDER BY review_time DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, ReviewLog>(&query)
            .bind(user_id)
            .bind(params.card_id)
            .bind(params.start_time)
            .bind(params.end_time)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Aggregate statistics for a user.
    ///
    /// `today_start` and `week_start` are epoch-ms boundaries computed by the
    /// caller.
    pub async fn stats(
        pool: &PgPool,
        user_id: DbId,
        today_start: EpochMillis,
        week_start: EpochMillis,
    ) -> Result<ReviewStats, sqlx::Error> {
        let row: (i64, i64, i64, Option<f64>, i64) = sqlx::query_as(
            "SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE review_time >= $2),
                COUNT(*) FILTER (WHERE review_time >= $3),
                AVG(rating)::DOUBLE PRECISION,
                COUNT(*) FILTER (WHERE rating >= $4)
             FROM review_logs
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(today_start)
        .bind(week_start)
        .bind(RETAINED_MIN_RATING)
        .fetch_one(pool)
        .await?;

        let (total, today, week, average, retained) = row;
        let retention_rate = if total > 0 {
            retained as f64 / total as f64
        } else {
            0.0
        };

        Ok(ReviewStats {
            total_reviews: total,
            reviews_today: today,
            reviews_this_week: week,
            average_rating: average.unwrap_or(0.0),
            retention_rate,
        })
    }
}

/// Insert one review log on an open connection or transaction.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    log: &NewReviewLog,
) -> Result<ReviewLog, sqlx::Error> {
    let query = format!(
        "INSERT INTO review_logs
            (user_id, card_id, review_time, rating,
             prev_state, new_state, prev_interval, new_interval,
             prev_ease_factor, new_ease_factor, prev_due, new_due,
             prev_stability, new_stability, prev_difficulty, new_difficulty, duration_ms)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, ReviewLog>(&query)
        .bind(log.user_id)
        .bind(log.card_id)
        .bind(log.review_time)
        .bind(log.rating)
        .bind(log.prev.state.as_str())
        .bind(log.next.state.as_str())
        .bind(log.prev.interval)
        .bind(log.next.interval)
        .bind(log.prev.ease_factor)
        .bind(log.next.ease_factor)
        .bind(log.prev.due)
        .bind(log.next.due)
        .bind(log.prev.stability)
        .bind(log.next.stability)
        .bind(log.prev.difficulty)
        .bind(log.next.difficulty)
        .bind(log.duration_ms)
        .fetch_one(&mut *conn)
        .await
}
