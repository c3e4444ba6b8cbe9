//! SuperMemo 2 scheduling.
//!
//! Ease factors are stored in thousandths. `new` and `relearning` cards move
//! through short fixed steps before graduating. Every other card, including
//! one left in `learning` by a Hard answer, grows its interval by the ease
//! factor and lands in `review`.

use super::{
    CardQueue, CardState, Rating, SchedulingState, Transition, DAY_MS, INITIAL_EASE_FACTOR,
    MINUTE_MS, MIN_EASE_FACTOR,
};
use crate::types::EpochMillis;

/// Longest interval SM-2 will schedule, in days.
pub const MAX_INTERVAL_DAYS: i32 = 365;

const AGAIN_DELAY_MS: i64 = 10 * MINUTE_MS;
const HARD_STEP_DELAY_MS: i64 = 5 * MINUTE_MS;
const GRADUATING_INTERVAL: i32 = 1;
const EASY_INTERVAL: i32 = 4;

const AGAIN_EASE_PENALTY: i32 = 200;
const HARD_EASE_PENALTY: i32 = 150;
const EASY_EASE_BONUS: i32 = 150;
const HARD_INTERVAL_FACTOR: f64 = 1.2;
const EASY_INTERVAL_FACTOR: f64 = 1.3;

pub fn schedule(current: &SchedulingState, rating: Rating, now: EpochMillis) -> Transition {
    let ease = if current.ease_factor > 0 {
        current.ease_factor
    } else {
        INITIAL_EASE_FACTOR
    };

    if rating == Rating::Again {
        return transition(
            CardState::Relearning,
            CardQueue::Learning,
            now + AGAIN_DELAY_MS,
            0,
            (ease - AGAIN_EASE_PENALTY).max(MIN_EASE_FACTOR),
            current,
        );
    }

    if matches!(current.state, CardState::New | CardState::Relearning) {
        return match rating {
            Rating::Hard => transition(
                CardState::Learning,
                CardQueue::Learning,
                now + HARD_STEP_DELAY_MS,
                0,
                ease,
                current,
            ),
            Rating::Good => graduate(GRADUATING_INTERVAL, ease, now, current),
            _ => graduate(EASY_INTERVAL, ease + EASY_EASE_BONUS, now, current),
        };
    }

    let new_ease = match rating {
        Rating::Hard => ease - HARD_EASE_PENALTY,
        Rating::Easy => ease + EASY_EASE_BONUS,
        _ => ease,
    }
    .max(MIN_EASE_FACTOR);

    let interval = f64::from(current.interval);
    let multiplier = f64::from(new_ease) / 1000.0;
    let raw = match rating {
        Rating::Hard => interval * HARD_INTERVAL_FACTOR,
        Rating::Good => interval * multiplier,
        _ => interval * multiplier * EASY_INTERVAL_FACTOR,
    };
    let next_interval = (raw.round() as i32).clamp(1, MAX_INTERVAL_DAYS);

    graduate(next_interval, new_ease, now, current)
}

fn graduate(interval: i32, ease: i32, now: EpochMillis, current: &SchedulingState) -> Transition {
    transition(
        CardState::Review,
        CardQueue::Review,
        now + i64::from(interval) * DAY_MS,
        interval,
        ease,
        current,
    )
}

/// SM-2 leaves the FSRS memory columns untouched.
fn transition(
    state: CardState,
    queue: CardQueue,
    due: EpochMillis,
    interval: i32,
    ease_factor: i32,
    current: &SchedulingState,
) -> Transition {
    Transition {
        state,
        queue,
        due,
        interval,
        ease_factor,
        stability: current.stability,
        difficulty: current.difficulty,
    }
}
