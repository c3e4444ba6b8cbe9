//! Review log model and statistics.

use deckhub_core::scheduler::SchedulingState;
use deckhub_core::types::{DbId, EpochMillis, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `review_logs` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewLog {
    pub id: DbId,
    pub user_id: DbId,
    pub card_id: DbId,
    pub review_time: EpochMillis,
    pub rating: i16,
    pub prev_state: Option<String>,
    pub new_state: Option<String>,
    pub prev_interval: Option<i32>,
    pub new_interval: Option<i32>,
    pub prev_ease_factor: Option<i32>,
    pub new_ease_factor: Option<i32>,
    pub prev_due: Option<EpochMillis>,
    pub new_due: Option<EpochMillis>,
    pub prev_stability: Option<f64>,
    pub new_stability: Option<f64>,
    pub prev_difficulty: Option<f64>,
    pub new_difficulty: Option<f64>,
    pub duration_ms: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert for one review, recording the card's state before and after.
#[derive(Debug, Clone)]
pub struct NewReviewLog {
    pub user_id: DbId,
    pub card_id: DbId,
    pub review_time: EpochMillis,
    pub rating: i16,
    pub prev: SchedulingState,
    pub next: SchedulingState,
    pub duration_ms: Option<i32>,
}

/// Query parameters for listing review logs.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewLogListParams {
    pub card_id: Option<DbId>,
    /// Inclusive lower bound on `review_time` (epoch ms).
    pub start_time: Option<EpochMillis>,
    /// Exclusive upper bound on `review_time` (epoch ms).
    pub end_time: Option<EpochMillis>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Aggregate review statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total_reviews: i64,
    pub reviews_today: i64,
    pub reviews_this_week: i64,
    pub average_rating: f64,
    /// Share of reviews rated Good or Easy, in `[0, 1]`.
    pub retention_rate: f64,
}
