//! Note model and card template entities.
//!
//! A note model defines the ordered field names of its notes; each of its
//! card templates produces one card per note.

use deckhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `note_models` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NoteModel {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub fields_schema: Vec<String>,
    pub css: Option<String>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `card_templates` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CardTemplate {
    pub id: DbId,
    pub note_model_id: DbId,
    pub name: String,
    pub ord: i32,
    pub question_template: String,
    pub answer_template: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A note model together with its templates, ordered by `ord`.
#[derive(Debug, Clone, Serialize)]
pub struct NoteModelWithTemplates {
    #[serde(flatten)]
    pub model: NoteModel,
    pub templates: Vec<CardTemplate>,
}

/// Template definition inside a [`CreateNoteModel`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardTemplate {
    pub name: String,
    pub ord: i32,
    pub question_template: String,
    pub answer_template: String,
}

/// DTO for creating a note model with its templates.
///
/// An empty `fields_schema` or `templates` is replaced by the defaults
/// (`Front` / `Back`, one template at `ord` 0) before insert.
#[derive(Debug, Deserialize)]
pub struct CreateNoteModel {
    pub name: String,
    #[serde(default)]
    pub fields_schema: Vec<String>,
    pub css: Option<String>,
    #[serde(default)]
    pub templates: Vec<CreateCardTemplate>,
}

/// DTO for updating a note model. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteModel {
    pub name: Option<String>,
    pub fields_schema: Option<Vec<String>>,
    pub css: Option<String>,
}

/// DTO for adding a template to an existing note model.
///
/// `ord` is only a request: it is kept when it sorts after every live
/// template, otherwise the template is appended.
#[derive(Debug, Deserialize)]
pub struct AddCardTemplate {
    pub name: String,
    pub ord: Option<i32>,
    pub question_template: String,
    pub answer_template: String,
}

/// Template insert with its final ordinal.
#[derive(Debug)]
pub struct NewCardTemplate {
    pub name: String,
    pub ord: i32,
    pub question_template: String,
    pub answer_template: String,
}

/// DTO for updating a card template. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCardTemplate {
    pub name: Option<String>,
    pub ord: Option<i32>,
    pub question_template: Option<String>,
    pub answer_template: Option<String>,
}
