//! Server-side card scheduling.
//!
//! [`schedule`] is a pure function of `(card state, rating, algorithm, now)`.
//! Two algorithms are available: classic SM-2 ([`sm2`]) and FSRS ([`fsrs`]).
//! Both produce a [`Transition`]; bookkeeping common to every review
//! (`reps`, `lapses`, `last_review`) is applied here.

pub mod fsrs;
pub mod sm2;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::EpochMillis;

pub const MINUTE_MS: i64 = 60 * 1000;
pub const DAY_MS: i64 = 24 * 60 * MINUTE_MS;

/// Ease factor of a fresh card, in thousandths (2500 = 2.5).
pub const INITIAL_EASE_FACTOR: i32 = 2500;
/// Lowest ease factor a card can reach.
pub const MIN_EASE_FACTOR: i32 = 1300;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// User answer grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub fn value(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for Rating {
    type Error = CoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(CoreError::Validation(format!(
                "Rating must be between 1 and 4, got {other}"
            ))),
        }
    }
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{}'", $label, other
                    ))),
                }
            }
        }
    };
}

string_enum! {
    /// Learning phase of a card.
    CardState, "card state" {
        New => "new",
        Learning => "learning",
        Review => "review",
        Relearning => "relearning",
    }
}

string_enum! {
    /// Queue a card is drawn from. `Suspended` cards are never shown.
    CardQueue, "card queue" {
        New => "new",
        Learning => "learning",
        Review => "review",
        Suspended => "suspended",
    }
}

/// Scheduling algorithm configured on a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerKind {
    #[default]
    Sm2,
    Fsrs,
}

impl SchedulerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SchedulerKind::Sm2 => "sm2",
            SchedulerKind::Fsrs => "fsrs",
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sm2" => Ok(SchedulerKind::Sm2),
            "fsrs" | "fsrs_v4" | "fsrs_v5" => Ok(SchedulerKind::Fsrs),
            other => Err(CoreError::Validation(format!(
                "Invalid scheduler '{other}'. Valid schedulers: sm2, fsrs"
            ))),
        }
    }
}

/// Queue an unsuspended card returns to: `new` while it has never been
/// answered, `review` otherwise.
pub fn unsuspended_queue(state: CardState) -> CardQueue {
    match state {
        CardState::New => CardQueue::New,
        _ => CardQueue::Review,
    }
}

// ---------------------------------------------------------------------------
// Card scheduling state
// ---------------------------------------------------------------------------

/// The scheduling columns of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    pub state: CardState,
    pub queue: CardQueue,
    /// Next due time in epoch milliseconds (0 for never-seen cards).
    pub due: EpochMillis,
    /// Current interval in days.
    pub interval: i32,
    /// Ease factor in thousandths.
    pub ease_factor: i32,
    pub reps: i32,
    pub lapses: i32,
    pub last_review: Option<EpochMillis>,
    pub stability: f64,
    pub difficulty: f64,
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            state: CardState::New,
            queue: CardQueue::New,
            due: 0,
            interval: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            reps: 0,
            lapses: 0,
            last_review: None,
            stability: 0.0,
            difficulty: 0.0,
        }
    }
}

/// Algorithm output for one review.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: CardState,
    pub queue: CardQueue,
    pub due: EpochMillis,
    pub interval: i32,
    pub ease_factor: i32,
    pub stability: f64,
    pub difficulty: f64,
}

/// Compute a card's state after it is reviewed with `rating` at `now`.
///
/// Suspended cards cannot be reviewed.
pub fn schedule(
    kind: SchedulerKind,
    current: &SchedulingState,
    rating: Rating,
    now: EpochMillis,
) -> Result<SchedulingState, CoreError> {
    if current.queue == CardQueue::Suspended {
        return Err(CoreError::Validation(
            "Suspended cards cannot be reviewed".into(),
        ));
    }

    let transition = match kind {
        SchedulerKind::Sm2 => sm2::schedule(current, rating, now),
        SchedulerKind::Fsrs => fsrs::schedule(current, rating, now),
    };

    let lapsed = current.state == CardState::Review && rating == Rating::Again;

    Ok(SchedulingState {
        state: transition.state,
        queue: transition.queue,
        due: transition.due,
        interval: transition.interval,
        ease_factor: transition.ease_factor,
        reps: current.reps.saturating_add(1),
        lapses: if lapsed {
            current.lapses.saturating_add(1)
        } else {
            current.lapses
        },
        last_review: Some(now),
        stability: transition.stability,
        difficulty: transition.difficulty,
    })
}
