//! Handlers for the `/decks` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use deckhub_core::deck::{normalize_scheduler, validate_deck_description, validate_deck_name};
use deckhub_core::error::CoreError;
use deckhub_core::ownership::ensure_owner;
use deckhub_core::types::DbId;
use deckhub_db::models::deck::{CreateDeck, Deck, UpdateDeck};
use deckhub_db::repositories::DeckRepo;
use deckhub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::note_model::find_owned_model;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a deck and check that `user_id` owns it.
///
/// A missing deck is `NotFound`; someone else's deck is `Forbidden`.
pub(crate) async fn find_owned_deck(
    pool: &DbPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<Deck> {
    let deck = DeckRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Deck", id }))?;
    ensure_owner("deck", deck.user_id, user_id)?;
    Ok(deck)
}

/// POST /api/v1/decks
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateDeck>,
) -> AppResult<(StatusCode, Json<DataResponse<Deck>>)> {
    validate_deck_name(&input.name)?;
    if let Some(description) = &input.description {
        validate_deck_description(description)?;
    }
    let scheduler = input
        .scheduler
        .as_deref()
        .map(normalize_scheduler)
        .transpose()?;
    if let Some(model_id) = input.note_model_id {
        find_owned_model(&state.pool, model_id, auth.user_id).await?;
    }

    let input = CreateDeck {
        scheduler: scheduler.map(str::to_string),
        ..input
    };
    let deck = DeckRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(user_id = auth.user_id, deck_id = deck.id, "Deck created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: deck })))
}

/// GET /api/v1/decks
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Deck>>>> {
    let decks = DeckRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: decks }))
}

/// GET /api/v1/decks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Deck>>> {
    let deck = find_owned_deck(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: deck }))
}

/// PUT /api/v1/decks/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDeck>,
) -> AppResult<Json<DataResponse<Deck>>> {
    find_owned_deck(&state.pool, id, auth.user_id).await?;

    if let Some(name) = &input.name {
        validate_deck_name(name)?;
    }
    if let Some(description) = &input.description {
        validate_deck_description(description)?;
    }
    let scheduler = input
        .scheduler
        .as_deref()
        .map(normalize_scheduler)
        .transpose()?;
    if let Some(model_id) = input.note_model_id {
        find_owned_model(&state.pool, model_id, auth.user_id).await?;
    }

    let input = UpdateDeck {
        scheduler: scheduler.map(str::to_string),
        ..input
    };
    let deck = DeckRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Deck", id }))?;
    Ok(Json(DataResponse { data: deck }))
}

/// DELETE /api/v1/decks/{id}
///
/// Soft-deletes the deck with its notes and cards. A published listing
/// keeps its snapshots but can no longer be republished.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_deck(&state.pool, id, auth.user_id).await?;

    if DeckRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, deck_id = id, "Deck deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Deck", id }))
    }
}
