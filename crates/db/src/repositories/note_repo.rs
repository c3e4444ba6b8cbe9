//! Repository for the `notes` table.
//!
//! Creating a note also creates its cards: one per live card template of the
//! note's model, in the same transaction.

use std::collections::HashSet;

use deckhub_core::content_hash::NoteContent;
use deckhub_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::card::Card;
use crate::models::note::{
    BatchCreateResult, NewNote, Note, NoteContentRow, NotePatch, NoteWithCards,
};
use crate::repositories::card_repo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, deck_id, note_model_id, guid, fields, tags, \
    source_type, source_meta, deleted_at, created_at, updated_at";

/// Provides CRUD operations for notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a note and generate its cards.
    pub async fn create_with_cards(
        pool: &PgPool,
        input: &NewNote,
    ) -> Result<NoteWithCards, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = insert_with_cards(&mut *tx, input).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Insert many notes into one deck, skipping any whose GUID already
    /// exists in the deck or earlier in the batch.
    ///
    /// All inserts share one transaction.
    pub async fn create_batch(
        pool: &PgPool,
        deck_id: DbId,
        inputs: &[NewNote],
    ) -> Result<BatchCreateResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let guids: Vec<&str> = inputs.iter().map(|n| n.guid.as_str()).collect();
        let existing: Vec<(String,)> = sqlx::query_as(
            "SELECT guid FROM notes
             WHERE deck_id = $1 AND deleted_at IS NULL AND guid = ANY($2)",
        )
        .bind(deck_id)
        .bind(&guids)
        .fetch_all(&mut *tx)
        .await?;

        let mut seen: HashSet<String> = existing.into_iter().map(|r| r.0).collect();
        let mut notes = Vec::new();
        let mut skipped = 0;

        for input in inputs {
            if !seen.insert(input.guid.clone()) {
                skipped += 1;
                continue;
            }
            let created = insert_with_cards(&mut *tx, input).await?;
            notes.push(created.note);
        }

        tx.commit().await?;
        Ok(BatchCreateResult {
            created: notes.len(),
            skipped,
            notes,
        })
    }

    /// Find a note by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a deck's notes, oldest first.
    pub async fn list_by_deck(
        pool: &PgPool,
        deck_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes
             WHERE deck_id = $1 AND deleted_at IS NULL
             ORDER BY created_at, id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(deck_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Fetch the hashed projection of every live note in a deck.
    ///
    /// Row order is unspecified; the content hash sorts its input.
    pub async fn list_content_by_deck(
        pool: &PgPool,
        deck_id: DbId,
    ) -> Result<Vec<NoteContent>, sqlx::Error> {
        let rows = sqlx::query_as::<_, NoteContentRow>(
            "SELECT guid, fields, tags FROM notes WHERE deck_id = $1 AND deleted_at IS NULL",
        )
        .bind(deck_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(NoteContent::from).collect())
    }

    /// Apply a patch to a note.
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        patch: &NotePatch,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET
                fields = COALESCE($2, fields),
                guid = COALESCE($3, guid),
                tags = COALESCE($4, tags)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(patch.fields.as_ref().map(Json))
            .bind(&patch.guid)
            .bind(&patch.tags)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a note and its cards. Returns `true` if the note was
    /// marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result =
            sqlx::query("UPDATE notes SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE cards SET deleted_at = NOW() WHERE note_id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

async fn insert_with_cards(
    conn: &mut PgConnection,
    input: &NewNote,
) -> Result<NoteWithCards, sqlx::Error> {
    let query = format!(
        "INSERT INTO notes
            (user_id, deck_id, note_model_id, guid, fields, tags, source_type, source_meta)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    );
    let note = sqlx::query_as::<_, Note>(&query)
        .bind(input.user_id)
        .bind(input.deck_id)
        .bind(input.note_model_id)
        .bind(&input.guid)
        .bind(Json(&input.fields))
        .bind(&input.tags)
        .bind(&input.source_type)
        .bind(&input.source_meta)
        .fetch_one(&mut *conn)
        .await?;

    let query = format!(
        "INSERT INTO cards (user_id, note_id, deck_id, card_template_id, ord)
         SELECT $1, $2, $3, t.id, t.ord
         FROM card_templates t
         WHERE t.note_model_id = $4 AND t.deleted_at IS NULL
         RETURNING {}",
        card_repo::COLUMNS
    );
    let mut cards = sqlx::query_as::<_, Card>(&query)
        .bind(note.user_id)
        .bind(note.id)
        .bind(note.deck_id)
        .bind(note.note_model_id)
        .fetch_all(&mut *conn)
        .await?;
    cards.sort_by_key(|c| c.ord);

    Ok(NoteWithCards { note, cards })
}
