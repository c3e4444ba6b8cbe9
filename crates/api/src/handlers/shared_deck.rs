//! Handlers for publishing decks to the marketplace and browsing it.
//!
//! Publishing fingerprints a deck's live notes and cards
//! ([`DeckContentSummary`]) and records a versioned snapshot. A republish
//! only happens when the fingerprint changed, and always moves the version
//! forward by exactly one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use deckhub_core::error::CoreError;
use deckhub_core::ownership::ensure_owner;
use deckhub_core::publish::{
    export_file_url, next_version, validate_language, validate_slug, validate_tags,
    validate_title, DeckContentSummary, DEFAULT_LANGUAGE, EXPORT_FORMAT_VERSION,
};
use deckhub_core::types::DbId;
use deckhub_db::models::shared_deck::{
    NewSharedDeck, PublishDeckRequest, PublishedDeck, SharedDeck, SharedDeckDetail,
    SharedDeckPage, SharedDeckSearchParams, SharedDeckSnapshot, UpdateSharedDeck, VersionBump,
};
use deckhub_db::repositories::{
    CardRepo, DeckRepo, NoteRepo, SharedDeckRepo, SharedDeckSnapshotRepo,
};
use deckhub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::deck::find_owned_deck;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Recompute counts and content hash from a deck's live notes and cards.
async fn load_content_summary(pool: &DbPool, deck_id: DbId) -> AppResult<DeckContentSummary> {
    let notes = NoteRepo::list_content_by_deck(pool, deck_id).await?;
    let cards = CardRepo::list_content_by_deck(pool, deck_id).await?;
    Ok(DeckContentSummary::from_content(&notes, &cards))
}

async fn find_shared_deck(pool: &DbPool, id: DbId) -> AppResult<SharedDeck> {
    SharedDeckRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SharedDeck",
            id,
        }))
}

/// Look a listing up by slug. Inactive listings are hidden from the public.
async fn find_public_by_slug(pool: &DbPool, slug: &str) -> AppResult<SharedDeck> {
    SharedDeckRepo::find_by_slug(pool, slug)
        .await?
        .filter(|d| d.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "SharedDeck",
                key: slug.to_string(),
            })
        })
}

// ---------------------------------------------------------------------------
// Publish / republish
// ---------------------------------------------------------------------------

/// POST /api/v1/decks/{deck_id}/publish
///
/// Checks run in a fixed order: deck exists, caller owns it, it is not
/// already published, input is valid, it has notes, the slug is free.
/// The listing and its v1 snapshot are written in one transaction.
pub async fn publish(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<PublishDeckRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishedDeck>>)> {
    let deck = find_owned_deck(&state.pool, deck_id, auth.user_id).await?;

    if let Some(existing) = SharedDeckRepo::find_by_source_deck(&state.pool, deck.id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Deck is already published as '{}'; republish it instead",
            existing.slug
        ))));
    }

    validate_slug(&input.slug)?;
    validate_title(&input.title)?;
    let language = input
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    validate_language(&language)?;
    validate_tags(&input.tags)?;

    let summary = load_content_summary(&state.pool, deck.id).await?;
    summary.ensure_publishable()?;

    if SharedDeckRepo::slug_exists(&state.pool, &input.slug).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Slug '{}' is already taken",
            input.slug
        ))));
    }

    let new_listing = NewSharedDeck {
        author_id: auth.user_id,
        source_deck_id: deck.id,
        file_url: export_file_url(&input.slug),
        slug: input.slug,
        title: input.title,
        description: input.description,
        language,
        tags: input.tags,
        note_count: summary.note_count,
        card_count: summary.card_count,
        content_hash: summary.content_hash.into_string(),
        export_format_version: EXPORT_FORMAT_VERSION,
    };
    let published = SharedDeckRepo::create_with_snapshot(&state.pool, &new_listing).await?;

    tracing::info!(
        user_id = auth.user_id,
        deck_id,
        shared_deck_id = published.shared_deck.id,
        version = published.shared_deck.version,
        content_hash = ?published.shared_deck.content_hash,
        "Deck published"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: published })))
}

/// POST /api/v1/shared-decks/{id}/republish
///
/// Rejects unchanged content with a validation error. A republish that
/// loses a race against another one fails with 409 and writes nothing.
pub async fn republish(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<PublishedDeck>>)> {
    let shared = find_shared_deck(&state.pool, id).await?;
    ensure_owner("shared deck", shared.author_id, auth.user_id)?;

    let source_deck_id = shared.source_deck_id.ok_or_else(|| {
        AppError::Core(CoreError::NotFoundByKey {
            entity: "Source deck",
            key: shared.slug.clone(),
        })
    })?;
    let deck = DeckRepo::find_by_id(&state.pool, source_deck_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Deck",
            id: source_deck_id,
        }))?;

    let summary = load_content_summary(&state.pool, deck.id).await?;
    let new_version = next_version(
        shared.version,
        shared.content_hash.as_deref(),
        &summary.content_hash,
    )?;
    summary.ensure_publishable()?;

    let bump = VersionBump {
        expected_version: shared.version,
        new_version,
        note_count: summary.note_count,
        card_count: summary.card_count,
        content_hash: summary.content_hash.into_string(),
        export_format_version: EXPORT_FORMAT_VERSION,
        file_url: export_file_url(&shared.slug),
    };
    let published = SharedDeckRepo::bump_version(&state.pool, id, &bump)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Shared deck {id} was republished concurrently; reload and retry"
            )))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        shared_deck_id = id,
        from_version = shared.version,
        version = new_version,
        "Deck republished"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: published })))
}

// ---------------------------------------------------------------------------
// Marketplace reads
// ---------------------------------------------------------------------------

/// GET /api/v1/shared-decks
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SharedDeckSearchParams>,
) -> AppResult<Json<DataResponse<SharedDeckPage>>> {
    let page = SharedDeckRepo::search(&state.pool, &params, false).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/shared-decks/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<SharedDeckDetail>>> {
    let shared_deck = find_public_by_slug(&state.pool, &slug).await?;
    let snapshots = SharedDeckSnapshotRepo::list_by_shared_deck(&state.pool, shared_deck.id).await?;
    Ok(Json(DataResponse {
        data: SharedDeckDetail {
            shared_deck,
            snapshots,
        },
    }))
}

/// GET /api/v1/shared-decks/{slug}/download
///
/// Returns the latest snapshot and counts the download.
pub async fn download(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<SharedDeckSnapshot>>> {
    let shared_deck = find_public_by_slug(&state.pool, &slug).await?;
    let snapshot = SharedDeckSnapshotRepo::find_latest(&state.pool, shared_deck.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Snapshot",
                key: slug.clone(),
            })
        })?;

    SharedDeckRepo::increment_download_count(&state.pool, shared_deck.id).await?;

    tracing::debug!(
        shared_deck_id = shared_deck.id,
        version = snapshot.version,
        "Shared deck downloaded"
    );
    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/v1/shared-decks/{id}/snapshots
///
/// Inactive listings only show their history to the author.
pub async fn list_snapshots(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SharedDeckSnapshot>>>> {
    let shared = find_shared_deck(&state.pool, id).await?;
    if !shared.is_active {
        ensure_owner("shared deck", shared.author_id, auth.user_id)?;
    }
    let snapshots = SharedDeckSnapshotRepo::list_by_shared_deck(&state.pool, id).await?;
    Ok(Json(DataResponse { data: snapshots }))
}

/// GET /api/v1/shared-decks/{id}/snapshots/{version}
///
/// Same visibility rule as the snapshot history.
pub async fn get_snapshot(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, version)): Path<(DbId, i32)>,
) -> AppResult<Json<DataResponse<SharedDeckSnapshot>>> {
    let shared = find_shared_deck(&state.pool, id).await?;
    if !shared.is_active {
        ensure_owner("shared deck", shared.author_id, auth.user_id)?;
    }
    let snapshot = SharedDeckSnapshotRepo::find_by_version(&state.pool, id, version)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundByKey {
                entity: "Snapshot",
                key: format!("{}@v{version}", shared.slug),
            })
        })?;
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// Author maintenance
// ---------------------------------------------------------------------------

/// PUT /api/v1/shared-decks/{id}
///
/// Metadata only; the version and content hash are left alone.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSharedDeck>,
) -> AppResult<Json<DataResponse<SharedDeck>>> {
    let shared = find_shared_deck(&state.pool, id).await?;
    ensure_owner("shared deck", shared.author_id, auth.user_id)?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(language) = &input.language {
        validate_language(language)?;
    }
    if let Some(tags) = &input.tags {
        validate_tags(tags)?;
    }

    let updated = SharedDeckRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SharedDeck",
            id,
        }))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/shared-decks/{id}
///
/// Soft delete. Snapshots are kept and the slug becomes available again.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let shared = find_shared_deck(&state.pool, id).await?;
    ensure_owner("shared deck", shared.author_id, auth.user_id)?;

    if SharedDeckRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, shared_deck_id = id, "Shared deck deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "SharedDeck",
            id,
        }))
    }
}
