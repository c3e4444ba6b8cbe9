//! Repository for the `cards` table.

use deckhub_core::content_hash::CardContent;
use deckhub_core::scheduler::SchedulingState;
use deckhub_core::types::{DbId, EpochMillis};
use sqlx::PgPool;

use crate::models::card::{Card, CardContentRow, CardListParams, CardStateCounts};
use crate::models::review_log::{NewReviewLog, ReviewLog};
use crate::repositories::review_log_repo;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, user_id, note_id, deck_id, card_template_id, ord, \
    state, queue, due, interval_days, ease_factor, reps, lapses, last_review, \
    stability, difficulty, deleted_at, created_at, updated_at";

/// Provides reads, queue changes and review updates for cards.
///
/// Cards are created together with their note (see `NoteRepo`).
pub struct CardRepo;

impl CardRepo {
    /// Find a card by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cards WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a deck's cards with optional state, queue and due filters,
    /// earliest due first.
    pub async fn list_by_deck(
        pool: &PgPool,
        deck_id: DbId,
        params: &CardListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Card>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cards
             WHERE deck_id = $1 AND deleted_at IS NULL
               AND ($2::TEXT IS NULL OR state = $2)
               AND ($3::TEXT IS NULL OR queue = $3)
               AND ($4::BIGINT IS NULL OR due <= $4)
             ORDER BY due, id
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(deck_id)
            .bind(&params.state)
            .bind(&params.queue)
            .bind(params.due_before)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// A user's unsuspended cards across decks, earliest due first.
    pub async fn list_due(
        pool: &PgPool,
        user_id: DbId,
        deck_id: Option<DbId>,
        due_before: Option<EpochMillis>,
        limit: i64,
    ) -> Result<Vec<Card>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cards
             WHERE user_id = $1 AND deleted_at IS NULL AND queue <> 'suspended'
               AND ($2::BIGINT IS NULL OR deck_id = $2)
               AND ($3::BIGINT IS NULL OR due <= $3)
             ORDER BY due, id
             LIMIT $4"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(user_id)
            .bind(deck_id)
            .bind(due_before)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count a user's live cards per state, optionally within one deck.
    pub async fn count_by_state(
        pool: &PgPool,
        user_id: DbId,
        deck_id: Option<DbId>,
    ) -> Result<CardStateCounts, sqlx::Error> {
        sqlx::query_as::<_, CardStateCounts>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE state = 'new') AS new,
                COUNT(*) FILTER (WHERE state = 'learning') AS learning,
                COUNT(*) FILTER (WHERE state = 'review') AS review,
                COUNT(*) FILTER (WHERE state = 'relearning') AS relearning,
                COUNT(*) FILTER (WHERE queue = 'suspended') AS suspended
             FROM cards
             WHERE user_id = $1 AND deleted_at IS NULL
               AND ($2::BIGINT IS NULL OR deck_id = $2)",
        )
        .bind(user_id)
        .bind(deck_id)
        .fetch_one(pool)
        .await
    }

    /// List the cards generated from one note, by template ordinal.
    pub async fn list_by_note(pool: &PgPool, note_id: DbId) -> Result<Vec<Card>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cards
             WHERE note_id = $1 AND deleted_at IS NULL
             ORDER BY ord"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(note_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch the hashed projection of every live card in a deck.
    ///
    /// Row order is unspecified; the content hash sorts its input.
    pub async fn list_content_by_deck(
        pool: &PgPool,
        deck_id: DbId,
    ) -> Result<Vec<CardContent>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CardContentRow>(
            "SELECT note_id, card_template_id, ord FROM cards
             WHERE deck_id = $1 AND deleted_at IS NULL",
        )
        .bind(deck_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(CardContent::from).collect())
    }

    /// Move a card to another queue (suspend / unsuspend).
    ///
    /// Returns `None` if no row with the given `id` exists (or is soft-deleted).
    pub async fn update_queue(
        pool: &PgPool,
        id: DbId,
        queue: &str,
    ) -> Result<Option<Card>, sqlx::Error> {
        let query = format!(
            "UPDATE cards SET queue = $2
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .bind(queue)
            .fetch_optional(pool)
            .await
    }

    /// Write a review result and its log entry in one transaction.
    ///
    /// The update only applies while the card's `reps` still equals
    /// `log.prev.reps`, so two concurrent reviews of the same card cannot
    /// both succeed. Returns `None` when that guard fails; nothing is written
    /// in that case.
    pub async fn apply_review(
        pool: &PgPool,
        card_id: DbId,
        next: &SchedulingState,
        log: &NewReviewLog,
    ) -> Result<Option<(Card, ReviewLog)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE cards SET
                state = $3,
                queue = $4,
                due = $5,
                interval_days = $6,
                ease_factor = $7,
                reps = $8,
                lapses = $9,
                last_review = $10,
                stability = $11,
                difficulty = $12
             WHERE id = $1 AND reps = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let card = sqlx::query_as::<_, Card>(&query)
            .bind(card_id)
            .bind(log.prev.reps)
            .bind(next.state.as_str())
            .bind(next.queue.as_str())
            .bind(next.due)
            .bind(next.interval)
            .bind(next.ease_factor)
            .bind(next.reps)
            .bind(next.lapses)
            .bind(next.last_review)
            .bind(next.stability)
            .bind(next.difficulty)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(card) = card else {
            return Ok(None);
        };

        let entry = review_log_repo::insert(&mut *tx, log).await?;

        tx.commit().await?;
        Ok(Some((card, entry)))
    }
}
