//! Shared deck (marketplace listing) and snapshot models.

use deckhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `shared_decks` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SharedDeck {
    pub id: DbId,
    pub author_id: DbId,
    pub source_deck_id: Option<DbId>,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub language: String,
    pub tags: Vec<String>,
    pub note_count: i32,
    pub card_count: i32,
    pub download_count: i32,
    pub version: i32,
    pub content_hash: Option<String>,
    pub is_featured: bool,
    pub is_official: bool,
    pub is_active: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `shared_deck_snapshots` table. Snapshots are never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SharedDeckSnapshot {
    pub id: DbId,
    pub shared_deck_id: DbId,
    pub version: i32,
    pub export_format_version: i32,
    pub file_url: String,
    pub content_hash: String,
    pub file_size: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A shared deck with its snapshot history (newest first).
#[derive(Debug, Clone, Serialize)]
pub struct SharedDeckDetail {
    #[serde(flatten)]
    pub shared_deck: SharedDeck,
    pub snapshots: Vec<SharedDeckSnapshot>,
}

/// Result of a publish or republish: the listing and the snapshot written.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedDeck {
    pub shared_deck: SharedDeck,
    pub snapshot: SharedDeckSnapshot,
}

/// Request body for the first publish of a deck.
#[derive(Debug, Deserialize)]
pub struct PublishDeckRequest {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Fully resolved insert for a new shared deck and its first snapshot.
#[derive(Debug, Clone)]
pub struct NewSharedDeck {
    pub author_id: DbId,
    pub source_deck_id: DbId,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub language: String,
    pub tags: Vec<String>,
    pub note_count: i32,
    pub card_count: i32,
    pub content_hash: String,
    pub export_format_version: i32,
    pub file_url: String,
}

/// Counts and hash written by a republish.
#[derive(Debug, Clone)]
pub struct VersionBump {
    /// The version the caller read; the update only applies if it still holds.
    pub expected_version: i32,
    pub new_version: i32,
    pub note_count: i32,
    pub card_count: i32,
    pub content_hash: String,
    pub export_format_version: i32,
    pub file_url: String,
}

/// DTO for the author's metadata update. Never touches version or hash.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSharedDeck {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

/// DTO for the admin flag toggles.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSharedDeckFlags {
    pub is_featured: Option<bool>,
    pub is_official: Option<bool>,
    pub is_active: Option<bool>,
}

/// Marketplace search filters.
#[derive(Debug, Default, Deserialize)]
pub struct SharedDeckSearchParams {
    pub language: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
    pub is_featured: Option<bool>,
    pub is_official: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SharedDeckPage {
    pub items: Vec<SharedDeck>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
