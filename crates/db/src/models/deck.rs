//! Deck model.

use deckhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `decks` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Deck {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub note_model_id: Option<DbId>,
    /// Stored scheduler name: `"sm2"` or `"fsrs"`.
    pub scheduler: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new deck.
#[derive(Debug, Deserialize)]
pub struct CreateDeck {
    pub name: String,
    pub description: Option<String>,
    pub note_model_id: Option<DbId>,
    pub scheduler: Option<String>,
}

/// DTO for updating a deck. Only non-`None` fields are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDeck {
    pub name: Option<String>,
    pub description: Option<String>,
    pub note_model_id: Option<DbId>,
    pub scheduler: Option<String>,
}
