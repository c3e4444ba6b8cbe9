//! Repository for the `decks` table.

use deckhub_core::types::DbId;
use sqlx::PgPool;

use crate::models::deck::{CreateDeck, Deck, UpdateDeck};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, description, note_model_id, scheduler, \
    deleted_at, created_at, updated_at";

/// Provides CRUD operations for decks.
pub struct DeckRepo;

impl DeckRepo {
    /// Insert a new deck owned by `user_id`. `scheduler` defaults to `sm2`.
    ///
    /// The scheduler name must already be normalised by the caller.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateDeck,
    ) -> Result<Deck, sqlx::Error> {
        let query = format!(
            "INSERT INTO decks (user_id, name, description, note_model_id, scheduler)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'sm2'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.note_model_id)
            .bind(&input.scheduler)
            .fetch_one(pool)
            .await
    }

    /// Find a deck by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM decks WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's decks, most recently created first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Deck>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM decks
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a deck. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDeck,
    ) -> Result<Option<Deck>, sqlx::Error> {
        let query = format!(
            "UPDATE decks SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                note_model_id = COALESCE($4, note_model_id),
                scheduler = COALESCE($5, scheduler)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deck>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.note_model_id)
            .bind(&input.scheduler)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a deck together with its notes and cards.
    ///
    /// Returns `true` if the deck was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE decks SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE cards SET deleted_at = NOW() WHERE deck_id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE notes SET deleted_at = NOW() WHERE deck_id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
