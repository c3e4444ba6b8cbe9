//! Admin-only marketplace moderation and system statistics.

use axum::extract::{Path, Query, State};
use axum::Json;
use deckhub_core::error::CoreError;
use deckhub_core::types::DbId;
use deckhub_db::models::shared_deck::{
    SharedDeck, SharedDeckPage, SharedDeckSearchParams, UpdateSharedDeckFlags,
};
use deckhub_db::models::stats::SystemStats;
use deckhub_db::repositories::{SharedDeckRepo, StatsRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/shared-decks
///
/// Same filters as the public search, but inactive listings are included.
pub async fn list_shared_decks(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SharedDeckSearchParams>,
) -> AppResult<Json<DataResponse<SharedDeckPage>>> {
    let page = SharedDeckRepo::search(&state.pool, &params, true).await?;
    Ok(Json(DataResponse { data: page }))
}

/// PUT /api/v1/admin/shared-decks/{id}/flags
pub async fn set_shared_deck_flags(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSharedDeckFlags>,
) -> AppResult<Json<DataResponse<SharedDeck>>> {
    let updated = SharedDeckRepo::set_flags(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SharedDeck",
            id,
        }))?;

    tracing::info!(
        admin_id = admin.user_id,
        shared_deck_id = id,
        is_featured = updated.is_featured,
        is_official = updated.is_official,
        is_active = updated.is_active,
        "Shared deck flags updated"
    );
    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/admin/stats
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SystemStats>>> {
    let stats = StatsRepo::system(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}
