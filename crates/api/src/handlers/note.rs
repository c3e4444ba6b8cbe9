//! Handlers for notes.
//!
//! Notes are created inside a deck (`/decks/{deck_id}/notes`) and addressed
//! directly afterwards (`/notes/{id}`). Creating a note generates one card
//! per template of its note model.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use deckhub_core::error::CoreError;
use deckhub_core::note::{
    generate_guid, validate_fields, validate_note_tags, validate_source_type, SOURCE_MANUAL,
};
use deckhub_core::ownership::ensure_owner;
use deckhub_core::types::DbId;
use deckhub_db::models::deck::Deck;
use deckhub_db::models::note::{
    BatchCreateNotes, BatchCreateResult, NewNote, Note, NoteInput, NotePatch, NoteWithCards,
    UpdateNote,
};
use deckhub_db::models::note_model::NoteModel;
use deckhub_db::repositories::{CardRepo, NoteModelRepo, NoteRepo};
use deckhub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::deck::find_owned_deck;
use crate::handlers::note_model::find_owned_model;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest number of notes accepted by one batch request.
const MAX_BATCH_SIZE: usize = 1000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_owned_note(pool: &DbPool, id: DbId, user_id: DbId) -> AppResult<Note> {
    let note = NoteRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Note", id }))?;
    ensure_owner("note", note.user_id, user_id)?;
    Ok(note)
}

/// Pick the note model for a new note: the requested one, else the deck's.
async fn resolve_model(
    pool: &DbPool,
    deck: &Deck,
    requested: Option<DbId>,
    user_id: DbId,
) -> AppResult<NoteModel> {
    let model_id = requested.or(deck.note_model_id).ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Deck has no default note model; pass note_model_id".into(),
        ))
    })?;
    find_owned_model(pool, model_id, user_id).await
}

/// Validate client input and derive the note's GUID.
fn build_new_note(
    user_id: DbId,
    deck: &Deck,
    model: &NoteModel,
    input: NoteInput,
) -> Result<NewNote, CoreError> {
    validate_fields(&model.fields_schema, &input.fields)?;
    validate_note_tags(&input.tags)?;
    let source_type = input
        .source_type
        .unwrap_or_else(|| SOURCE_MANUAL.to_string());
    validate_source_type(&source_type)?;

    Ok(NewNote {
        user_id,
        deck_id: deck.id,
        note_model_id: model.id,
        guid: generate_guid(&model.fields_schema, &input.fields),
        fields: input.fields,
        tags: input.tags,
        source_type,
        source_meta: input.source_meta,
    })
}

// ---------------------------------------------------------------------------
// Deck-scoped endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/decks/{deck_id}/notes
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<NoteInput>,
) -> AppResult<(StatusCode, Json<DataResponse<NoteWithCards>>)> {
    let deck = find_owned_deck(&state.pool, deck_id, auth.user_id).await?;
    let model = resolve_model(&state.pool, &deck, input.note_model_id, auth.user_id).await?;
    let new_note = build_new_note(auth.user_id, &deck, &model, input)?;

    let created = NoteRepo::create_with_cards(&state.pool, &new_note).await?;

    tracing::info!(
        user_id = auth.user_id,
        deck_id,
        note_id = created.note.id,
        cards = created.cards.len(),
        "Note created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/decks/{deck_id}/notes/batch
///
/// Notes whose GUID already exists in the deck (or earlier in the batch)
/// are skipped. One invalid note rejects the whole batch.
pub async fn create_batch(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Json(input): Json<BatchCreateNotes>,
) -> AppResult<(StatusCode, Json<DataResponse<BatchCreateResult>>)> {
    if input.notes.is_empty() || input.notes.len() > MAX_BATCH_SIZE {
        return Err(AppError::Core(CoreError::Validation(format!(
            "A batch must contain 1 to {MAX_BATCH_SIZE} notes"
        ))));
    }

    let deck = find_owned_deck(&state.pool, deck_id, auth.user_id).await?;

    let mut models: HashMap<Option<DbId>, NoteModel> = HashMap::new();
    let mut new_notes = Vec::with_capacity(input.notes.len());
    for note in input.notes {
        let model = match models.get(&note.note_model_id) {
            Some(model) => model.clone(),
            None => {
                let model =
                    resolve_model(&state.pool, &deck, note.note_model_id, auth.user_id).await?;
                models.insert(note.note_model_id, model.clone());
                model
            }
        };
        new_notes.push(build_new_note(auth.user_id, &deck, &model, note)?);
    }

    let result = NoteRepo::create_batch(&state.pool, deck_id, &new_notes).await?;

    tracing::info!(
        user_id = auth.user_id,
        deck_id,
        created = result.created,
        skipped = result.skipped,
        "Batch notes created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// GET /api/v1/decks/{deck_id}/notes
pub async fn list_by_deck(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Note>>>> {
    find_owned_deck(&state.pool, deck_id, auth.user_id).await?;
    let (limit, offset) = params.resolve();
    let notes = NoteRepo::list_by_deck(&state.pool, deck_id, limit, offset).await?;
    Ok(Json(DataResponse { data: notes }))
}

// ---------------------------------------------------------------------------
// Note endpoints
// ---------------------------------------------------------------------------

/// GET /api/v1/notes/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NoteWithCards>>> {
    let note = find_owned_note(&state.pool, id, auth.user_id).await?;
    let cards = CardRepo::list_by_note(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: NoteWithCards { note, cards },
    }))
}

/// PUT /api/v1/notes/{id}
///
/// Changing the fields recomputes the GUID.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNote>,
) -> AppResult<Json<DataResponse<Note>>> {
    let note = find_owned_note(&state.pool, id, auth.user_id).await?;

    let mut patch = NotePatch::default();
    if let Some(fields) = input.fields {
        let model = NoteModelRepo::find_by_id(&state.pool, note.note_model_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "NoteModel",
                id: note.note_model_id,
            }))?;
        validate_fields(&model.fields_schema, &fields)?;
        patch.guid = Some(generate_guid(&model.fields_schema, &fields));
        patch.fields = Some(fields);
    }
    if let Some(tags) = input.tags {
        validate_note_tags(&tags)?;
        patch.tags = Some(tags);
    }

    let updated = NoteRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Note", id }))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/notes/{id}
///
/// Soft-deletes the note and its cards.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_note(&state.pool, id, auth.user_id).await?;

    if NoteRepo::soft_delete(&state.pool, id).await? {
        tracing::info!(user_id = auth.user_id, note_id = id, "Note deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Note", id }))
    }
}
