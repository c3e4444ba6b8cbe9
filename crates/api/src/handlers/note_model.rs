//! Handlers for the `/note-models` resource.
//!
//! A note model fixes the ordered field names of its notes and the card
//! templates generated for each note. Template changes only affect notes
//! created afterwards.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use deckhub_core::error::CoreError;
use deckhub_core::note::{
    next_template_ord, validate_field_schema, validate_model_name, validate_template,
    validate_templates, DEFAULT_ANSWER_TEMPLATE, DEFAULT_FIELDS, DEFAULT_QUESTION_TEMPLATE,
};
use deckhub_core::ownership::ensure_owner;
use deckhub_core::types::DbId;
use deckhub_db::models::note_model::{
    AddCardTemplate, CardTemplate, CreateCardTemplate, CreateNoteModel, NewCardTemplate,
    NoteModel, NoteModelWithTemplates, UpdateCardTemplate, UpdateNoteModel,
};
use deckhub_db::repositories::NoteModelRepo;
use deckhub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) async fn find_owned_model(
    pool: &DbPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<NoteModel> {
    let model = NoteModelRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "NoteModel",
            id,
        }))?;
    ensure_owner("note model", model.user_id, user_id)?;
    Ok(model)
}

/// POST /api/v1/note-models
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<CreateNoteModel>,
) -> AppResult<(StatusCode, Json<DataResponse<NoteModelWithTemplates>>)> {
    validate_model_name(&input.name)?;

    if input.fields_schema.is_empty() {
        input.fields_schema = DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect();
    }
    validate_field_schema(&input.fields_schema)?;

    if input.templates.is_empty() {
        input.templates.push(CreateCardTemplate {
            name: "Card 1".to_string(),
            ord: 0,
            question_template: DEFAULT_QUESTION_TEMPLATE.to_string(),
            answer_template: DEFAULT_ANSWER_TEMPLATE.to_string(),
        });
    }
    let pairs: Vec<(&str, i32)> = input
        .templates
        .iter()
        .map(|t| (t.name.as_str(), t.ord))
        .collect();
    validate_templates(&pairs)?;

    let created = NoteModelRepo::create_with_templates(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        note_model_id = created.model.id,
        templates = created.templates.len(),
        "Note model created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/note-models
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<NoteModel>>>> {
    let models = NoteModelRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: models }))
}

/// GET /api/v1/note-models/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<NoteModelWithTemplates>>> {
    let model = find_owned_model(&state.pool, id, auth.user_id).await?;
    let templates = NoteModelRepo::list_templates(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: NoteModelWithTemplates { model, templates },
    }))
}

/// PUT /api/v1/note-models/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateNoteModel>,
) -> AppResult<Json<DataResponse<NoteModel>>> {
    find_owned_model(&state.pool, id, auth.user_id).await?;

    if let Some(name) = &input.name {
        validate_model_name(name)?;
    }
    if let Some(schema) = &input.fields_schema {
        validate_field_schema(schema)?;
    }

    let model = NoteModelRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "NoteModel",
            id,
        }))?;

    tracing::info!(user_id = auth.user_id, note_model_id = id, "Note model updated");
    Ok(Json(DataResponse { data: model }))
}

// ---------------------------------------------------------------------------
// Card templates
// ---------------------------------------------------------------------------

fn template_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CardTemplate",
        id,
    })
}

/// GET /api/v1/note-models/{id}/templates
pub async fn list_templates(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CardTemplate>>>> {
    find_owned_model(&state.pool, id, auth.user_id).await?;
    let templates = NoteModelRepo::list_templates(&state.pool, id).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/v1/note-models/{id}/templates
pub async fn create_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddCardTemplate>,
) -> AppResult<(StatusCode, Json<DataResponse<CardTemplate>>)> {
    find_owned_model(&state.pool, id, auth.user_id).await?;

    let max_ord = NoteModelRepo::max_template_ord(&state.pool, id).await?;
    let ord = next_template_ord(input.ord, max_ord);
    validate_template(&input.name, ord)?;

    let new = NewCardTemplate {
        name: input.name,
        ord,
        question_template: input.question_template,
        answer_template: input.answer_template,
    };
    let template = NoteModelRepo::create_template(&state.pool, id, &new).await?;

    tracing::info!(
        user_id = auth.user_id,
        note_model_id = id,
        template_id = template.id,
        ord,
        "Card template added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /api/v1/note-models/{id}/templates/{template_id}
pub async fn get_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, template_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CardTemplate>>> {
    find_owned_model(&state.pool, id, auth.user_id).await?;
    let template = NoteModelRepo::find_template(&state.pool, id, template_id)
        .await?
        .ok_or_else(|| template_not_found(template_id))?;
    Ok(Json(DataResponse { data: template }))
}

/// PUT /api/v1/note-models/{id}/templates/{template_id}
///
/// Moving a template onto an ordinal another live template holds is a 409.
pub async fn update_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, template_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCardTemplate>,
) -> AppResult<Json<DataResponse<CardTemplate>>> {
    find_owned_model(&state.pool, id, auth.user_id).await?;
    let current = NoteModelRepo::find_template(&state.pool, id, template_id)
        .await?
        .ok_or_else(|| template_not_found(template_id))?;

    validate_template(
        input.name.as_deref().unwrap_or(&current.name),
        input.ord.unwrap_or(current.ord),
    )?;

    let template = NoteModelRepo::update_template(&state.pool, id, template_id, &input)
        .await?
        .ok_or_else(|| template_not_found(template_id))?;

    tracing::info!(
        user_id = auth.user_id,
        note_model_id = id,
        template_id,
        "Card template updated"
    );
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/note-models/{id}/templates/{template_id}
///
/// A model keeps at least one template. Cards generated from a deleted
/// template stay in their decks.
pub async fn delete_template(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, template_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_owned_model(&state.pool, id, auth.user_id).await?;
    NoteModelRepo::find_template(&state.pool, id, template_id)
        .await?
        .ok_or_else(|| template_not_found(template_id))?;

    if NoteModelRepo::count_templates(&state.pool, id).await? <= 1 {
        return Err(AppError::Core(CoreError::Validation(
            "A note model needs at least one card template".into(),
        )));
    }

    if NoteModelRepo::soft_delete_template(&state.pool, id, template_id).await? {
        tracing::info!(
            user_id = auth.user_id,
            note_model_id = id,
            template_id,
            "Card template deleted"
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(template_not_found(template_id))
    }
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// DELETE /api/v1/note-models/{id}
///
/// Refused with 409 while live notes still use the model.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_model(&state.pool, id, auth.user_id).await?;

    if NoteModelRepo::has_notes(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Note model is still used by notes".into(),
        )));
    }

    if NoteModelRepo::soft_delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "NoteModel",
            id,
        }))
    }
}
