//! Handlers for review history.

use axum::extract::{Path, Query, State};
use axum::Json;
use deckhub_core::error::CoreError;
use deckhub_core::ownership::ensure_owner;
use deckhub_core::review::period_starts;
use deckhub_core::types::DbId;
use deckhub_db::models::review_log::{ReviewLog, ReviewLogListParams, ReviewStats};
use deckhub_db::repositories::ReviewLogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::page;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/review-logs
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReviewLogListParams>,
) -> AppResult<Json<DataResponse<Vec<ReviewLog>>>> {
    let (limit, offset) = page(params.limit, params.offset);
    let logs =
        ReviewLogRepo::list_by_user(&state.pool, auth.user_id, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /api/v1/review-logs/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReviewLog>>> {
    let log = ReviewLogRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ReviewLog",
            id,
        }))?;
    ensure_owner("review log", log.user_id, auth.user_id)?;
    Ok(Json(DataResponse { data: log }))
}

/// GET /api/v1/review-logs/stats
///
/// "Today" and "this week" are UTC calendar periods.
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ReviewStats>>> {
    let (today_start, week_start) = period_starts(chrono::Utc::now());
    let stats = ReviewLogRepo::stats(&state.pool, auth.user_id, today_start, week_start).await?;
    Ok(Json(DataResponse { data: stats }))
}
