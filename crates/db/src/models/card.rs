//! Card entity model, filters and the scheduling projection.

use deckhub_core::content_hash::CardContent;
use deckhub_core::error::CoreError;
use deckhub_core::scheduler::SchedulingState;
use deckhub_core::types::{DbId, EpochMillis, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `cards` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Card {
    pub id: DbId,
    pub user_id: DbId,
    pub note_id: DbId,
    pub deck_id: DbId,
    pub card_template_id: DbId,
    pub ord: i32,
    pub state: String,
    pub queue: String,
    pub due: EpochMillis,
    #[serde(rename = "interval")]
    pub interval_days: i32,
    pub ease_factor: i32,
    pub reps: i32,
    pub lapses: i32,
    pub last_review: Option<EpochMillis>,
    pub stability: f64,
    pub difficulty: f64,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Card {
    /// Parse the stored scheduling columns.
    ///
    /// Fails with `Internal` if a stored state or queue is not a known value,
    /// which the table's CHECK constraints rule out.
    pub fn scheduling_state(&self) -> Result<SchedulingState, CoreError> {
        let state = self
            .state
            .parse()
            .map_err(|_| CoreError::Internal(format!("Card {} has invalid state", self.id)))?;
        let queue = self
            .queue
            .parse()
            .map_err(|_| CoreError::Internal(format!("Card {} has invalid queue", self.id)))?;
        Ok(SchedulingState {
            state,
            queue,
            due: self.due,
            interval: self.interval_days,
            ease_factor: self.ease_factor,
            reps: self.reps,
            lapses: self.lapses,
            last_review: self.last_review,
            stability: self.stability,
            difficulty: self.difficulty,
        })
    }
}

/// The hashed projection of a card row.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CardContentRow {
    pub note_id: DbId,
    pub card_template_id: DbId,
    pub ord: i32,
}

impl From<CardContentRow> for CardContent {
    fn from(row: CardContentRow) -> Self {
        CardContent {
            note_id: row.note_id,
            card_template_id: row.card_template_id,
            ord: row.ord,
        }
    }
}

/// Query parameters for listing a deck's cards.
#[derive(Debug, Default, Deserialize)]
pub struct CardListParams {
    pub state: Option<String>,
    pub queue: Option<String>,
    /// Only cards with `due <= due_before` (epoch ms).
    pub due_before: Option<EpochMillis>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for the cross-deck due queue.
#[derive(Debug, Default, Deserialize)]
pub struct DueCardParams {
    pub deck_id: Option<DbId>,
    /// Only cards with `due <= due_before` (epoch ms). Absent means every
    /// unsuspended card, earliest first.
    pub due_before: Option<EpochMillis>,
    pub limit: Option<i64>,
}

/// Query parameters for card state counts.
#[derive(Debug, Default, Deserialize)]
pub struct CardStatsParams {
    pub deck_id: Option<DbId>,
}

/// Number of live cards in each learning state. Suspended cards are
/// counted under their state and again under `suspended`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CardStateCounts {
    pub total: i64,
    pub new: i64,
    pub learning: i64,
    pub review: i64,
    pub relearning: i64,
    pub suspended: i64,
}

/// DTO for reviewing a card.
#[derive(Debug, Deserialize)]
pub struct ReviewCard {
    pub rating: i16,
    pub duration_ms: Option<i32>,
}
