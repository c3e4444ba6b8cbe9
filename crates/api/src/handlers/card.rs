//! Handlers for cards.
//!
//! Scheduling columns are never written directly. Suspend and unsuspend
//! only move a card between queues, and `POST /cards/{id}/review` runs the
//! deck's scheduler.

use axum::extract::{Path, Query, State};
use axum::Json;
use deckhub_core::error::CoreError;
use deckhub_core::ownership::ensure_owner;
use deckhub_core::scheduler::{
    schedule, unsuspended_queue, CardQueue, CardState, Rating, SchedulerKind,
};
use deckhub_core::search::clamp_limit;
use deckhub_core::types::DbId;
use deckhub_db::models::card::{
    Card, CardListParams, CardStateCounts, CardStatsParams, DueCardParams, ReviewCard,
};
use deckhub_db::models::review_log::{NewReviewLog, ReviewLog};
use deckhub_db::repositories::{CardRepo, DeckRepo};
use deckhub_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::deck::find_owned_deck;
use crate::middleware::auth::AuthUser;
use crate::query::{page, MAX_PAGE_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// Default size of the due queue.
const DEFAULT_DUE_LIMIT: i64 = 100;

/// Response for a review: the updated card and the log entry written.
#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    pub card: Card,
    pub review_log: ReviewLog,
}

async fn find_owned_card(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Card> {
    let card = CardRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Card", id }))?;
    ensure_owner("card", card.user_id, user_id)?;
    Ok(card)
}

/// GET /api/v1/decks/{deck_id}/cards
pub async fn list_by_deck(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Query(params): Query<CardListParams>,
) -> AppResult<Json<DataResponse<Vec<Card>>>> {
    find_owned_deck(&state.pool, deck_id, auth.user_id).await?;

    if let Some(s) = &params.state {
        s.parse::<CardState>()?;
    }
    if let Some(q) = &params.queue {
        q.parse::<CardQueue>()?;
    }

    let (limit, offset) = page(params.limit, params.offset);
    let cards = CardRepo::list_by_deck(&state.pool, deck_id, &params, limit, offset).await?;
    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/v1/cards/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Card>>> {
    let card = find_owned_card(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: card }))
}

/// GET /api/v1/cards/due
///
/// The study queue across all of the caller's decks, or one deck when
/// `deck_id` is given. Suspended cards are never returned.
pub async fn list_due(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DueCardParams>,
) -> AppResult<Json<DataResponse<Vec<Card>>>> {
    if let Some(deck_id) = params.deck_id {
        find_owned_deck(&state.pool, deck_id, auth.user_id).await?;
    }
    let limit = clamp_limit(params.limit, DEFAULT_DUE_LIMIT, MAX_PAGE_LIMIT);
    let cards = CardRepo::list_due(
        &state.pool,
        auth.user_id,
        params.deck_id,
        params.due_before,
        limit,
    )
    .await?;
    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/v1/cards/stats
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CardStatsParams>,
) -> AppResult<Json<DataResponse<CardStateCounts>>> {
    if let Some(deck_id) = params.deck_id {
        find_owned_deck(&state.pool, deck_id, auth.user_id).await?;
    }
    let counts = CardRepo::count_by_state(&state.pool, auth.user_id, params.deck_id).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// POST /api/v1/cards/{id}/suspend
pub async fn suspend(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Card>>> {
    let card = find_owned_card(&state.pool, id, auth.user_id).await?;
    let card = set_queue(&state.pool, card, CardQueue::Suspended).await?;
    tracing::info!(user_id = auth.user_id, card_id = id, "Card suspended");
    Ok(Json(DataResponse { data: card }))
}

/// POST /api/v1/cards/{id}/unsuspend
///
/// The card goes back to the queue its state implies. Unsuspending a card
/// that is not suspended leaves it unchanged.
pub async fn unsuspend(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Card>>> {
    let card = find_owned_card(&state.pool, id, auth.user_id).await?;
    let current = card.scheduling_state()?;
    if current.queue != CardQueue::Suspended {
        return Ok(Json(DataResponse { data: card }));
    }

    let card = set_queue(&state.pool, card, unsuspended_queue(current.state)).await?;
    tracing::info!(user_id = auth.user_id, card_id = id, queue = %card.queue, "Card unsuspended");
    Ok(Json(DataResponse { data: card }))
}

async fn set_queue(pool: &DbPool, card: Card, queue: CardQueue) -> AppResult<Card> {
    let id = card.id;
    CardRepo::update_queue(pool, id, queue.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Card", id }))
}

/// POST /api/v1/cards/{id}/review
///
/// Schedules the card with its deck's algorithm, then writes the card and a
/// review log in one transaction. A concurrent review of the same card
/// makes the later one fail with 409.
pub async fn review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewCard>,
) -> AppResult<Json<DataResponse<ReviewOutcome>>> {
    let rating = Rating::try_from(input.rating)?;
    if input.duration_ms.is_some_and(|d| d < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "duration_ms must not be negative".into(),
        )));
    }

    let card = find_owned_card(&state.pool, id, auth.user_id).await?;
    let deck = DeckRepo::find_by_id(&state.pool, card.deck_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: card.deck_id,
        }))?;
    let kind: SchedulerKind = deck.scheduler.parse()?;

    let now = chrono::Utc::now().timestamp_millis();
    let prev = card.scheduling_state()?;
    let next = schedule(kind, &prev, rating, now)?;

    let log = NewReviewLog {
        user_id: auth.user_id,
        card_id: card.id,
        review_time: now,
        rating: rating.value(),
        prev,
        next: next.clone(),
        duration_ms: input.duration_ms,
    };

    let (card, review_log) = CardRepo::apply_review(&state.pool, id, &next, &log)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Card was reviewed concurrently; reload and retry".into(),
            ))
        })?;

    tracing::debug!(
        user_id = auth.user_id,
        card_id = id,
        scheduler = kind.as_str(),
        rating = rating.value(),
        state = %next.state,
        interval = next.interval,
        "Card reviewed"
    );
    Ok(Json(DataResponse {
        data: ReviewOutcome { card, review_log },
    }))
}
