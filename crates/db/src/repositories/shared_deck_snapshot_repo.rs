//! Repository for the `shared_deck_snapshots` table.
//!
//! Snapshots are written only inside `SharedDeckRepo`'s publish
//! transactions; this repository is read-only.

use deckhub_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::shared_deck::SharedDeckSnapshot;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, shared_deck_id, version, export_format_version, file_url, \
    content_hash, file_size, created_at, updated_at";

/// Provides read access to shared deck snapshots.
pub struct SharedDeckSnapshotRepo;

impl SharedDeckSnapshotRepo {
    /// List a shared deck's snapshots, newest version first.
    pub async fn list_by_shared_deck(
        pool: &PgPool,
        shared_deck_id: DbId,
    ) -> Result<Vec<SharedDeckSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shared_deck_snapshots
             WHERE shared_deck_id = $1
             ORDER BY version DESC"
        );
        sqlx::query_as::<_, SharedDeckSnapshot>(&query)
            .bind(shared_deck_id)
            .fetch_all(pool)
            .await
    }

    /// The snapshot with the highest version, if any.
    pub async fn find_latest(
        pool: &PgPool,
        shared_deck_id: DbId,
    ) -> Result<Option<SharedDeckSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shared_deck_snapshots
             WHERE shared_deck_id = $1
             ORDER BY version DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, SharedDeckSnapshot>(&query)
            .bind(shared_deck_id)
            .fetch_optional(pool)
            .await
    }

    /// Find one specific version.
    pub async fn find_by_version(
        pool: &PgPool,
        shared_deck_id: DbId,
        version: i32,
    ) -> Result<Option<SharedDeckSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shared_deck_snapshots
             WHERE shared_deck_id = $1 AND version = $2"
        );
        sqlx::query_as::<_, SharedDeckSnapshot>(&query)
            .bind(shared_deck_id)
            .bind(version)
            .fetch_optional(pool)
            .await
    }
}

/// Append a snapshot row on an open transaction.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    shared_deck_id: DbId,
    version: i32,
    export_format_version: i32,
    file_url: &str,
    content_hash: &str,
) -> Result<SharedDeckSnapshot, sqlx::Error> {
    let query = format!(
        "INSERT INTO shared_deck_snapshots
            (shared_deck_id, version, export_format_version, file_url, content_hash)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, SharedDeckSnapshot>(&query)
        .bind(shared_deck_id)
        .bind(version)
        .bind(export_format_version)
        .bind(file_url)
        .bind(content_hash)
        .fetch_one(&mut *conn)
        .await
}
