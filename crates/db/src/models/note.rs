//! Note entity model and DTOs.

use std::collections::BTreeMap;

use deckhub_core::content_hash::NoteContent;
use deckhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// Field name to value.
pub type NoteFields = BTreeMap<String, String>;

/// A row from the `notes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: DbId,
    pub user_id: DbId,
    pub deck_id: DbId,
    pub note_model_id: DbId,
    pub guid: String,
    pub fields: Json<NoteFields>,
    pub tags: Vec<String>,
    pub source_type: String,
    pub source_meta: Option<serde_json::Value>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The hashed projection of a note row.
#[derive(Debug, Clone, FromRow)]
pub struct NoteContentRow {
    pub guid: String,
    pub fields: Json<NoteFields>,
    pub tags: Vec<String>,
}

impl From<NoteContentRow> for NoteContent {
    fn from(row: NoteContentRow) -> Self {
        NoteContent {
            guid: row.guid,
            fields: row.fields.0,
            tags: row.tags,
        }
    }
}

/// Note fields supplied by a client. Owner, deck, model and guid are
/// resolved by the handler.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    /// Defaults to the deck's note model.
    pub note_model_id: Option<DbId>,
    pub fields: NoteFields,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source_type: Option<String>,
    pub source_meta: Option<serde_json::Value>,
}

/// Request body for a batch insert into one deck.
#[derive(Debug, Deserialize)]
pub struct BatchCreateNotes {
    pub notes: Vec<NoteInput>,
}

/// Fully resolved insert for one note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub user_id: DbId,
    pub deck_id: DbId,
    pub note_model_id: DbId,
    pub guid: String,
    pub fields: NoteFields,
    pub tags: Vec<String>,
    pub source_type: String,
    pub source_meta: Option<serde_json::Value>,
}

/// Resolved patch for a note. `guid` is set whenever `fields` is.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub fields: Option<NoteFields>,
    pub guid: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// DTO for updating a note's content.
#[derive(Debug, Deserialize)]
pub struct UpdateNote {
    pub fields: Option<NoteFields>,
    pub tags: Option<Vec<String>>,
}

/// A created note with the cards generated for it.
#[derive(Debug, Clone, Serialize)]
pub struct NoteWithCards {
    #[serde(flatten)]
    pub note: Note,
    pub cards: Vec<crate::models::card::Card>,
}

/// Outcome of a batch insert.
#[derive(Debug, Clone, Serialize)]
pub struct BatchCreateResult {
    pub created: usize,
    pub skipped: usize,
    pub notes: Vec<Note>,
}
