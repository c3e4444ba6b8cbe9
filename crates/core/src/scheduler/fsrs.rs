//! FSRS-4.5 scheduling with the published default parameters.
//!
//! Memory state is the pair `(stability, difficulty)`: stability is the
//! interval in days at which recall probability falls to 90%, difficulty lies
//! in `[1, 10]`. New and lapsed cards pass through minute-level learning steps
//! before they are handed a day interval. No interval fuzz is applied, so the
//! output is a pure function of its inputs.

use super::{
    CardQueue, CardState, Rating, SchedulingState, Transition, DAY_MS, MINUTE_MS,
    INITIAL_EASE_FACTOR, MIN_EASE_FACTOR,
};
use crate::types::EpochMillis;

/// Default FSRS-4.5 weights `w0..w16`.
pub const DEFAULT_WEIGHTS: [f64; 17] = [
    0.4872, 1.4003, 3.7145, 13.8206, 5.1618, 1.2298, 0.8975, 0.031, 1.6474, 0.1367, 1.0461,
    2.1072, 0.0793, 0.3246, 1.587, 0.2272, 2.8755,
];

pub const REQUEST_RETENTION: f64 = 0.9;
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

const DECAY: f64 = -0.5;
const FACTOR: f64 = 19.0 / 81.0;

const MIN_DIFFICULTY: f64 = 1.0;
const MAX_DIFFICULTY: f64 = 10.0;
const MIN_STABILITY: f64 = 0.01;

const NEW_AGAIN_STEP_MS: i64 = MINUTE_MS;
const NEW_HARD_STEP_MS: i64 = 5 * MINUTE_MS;
const NEW_GOOD_STEP_MS: i64 = 10 * MINUTE_MS;
const LEARNING_AGAIN_STEP_MS: i64 = 5 * MINUTE_MS;
const LEARNING_HARD_STEP_MS: i64 = 10 * MINUTE_MS;

fn w(i: usize) -> f64 {
    DEFAULT_WEIGHTS[i]
}

fn grade(rating: Rating) -> f64 {
    f64::from(rating.value())
}

fn clamp_difficulty(d: f64) -> f64 {
    d.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

pub fn init_stability(rating: Rating) -> f64 {
    w(rating as usize - 1).max(MIN_STABILITY)
}

pub fn init_difficulty(rating: Rating) -> f64 {
    clamp_difficulty(w(4) - (grade(rating) - 3.0) * w(5))
}

/// Probability of recall after `elapsed_days` at stability `stability`.
pub fn retrievability(elapsed_days: f64, stability: f64) -> f64 {
    (1.0 + FACTOR * elapsed_days / stability).powf(DECAY)
}

/// Days until recall probability drops to the requested retention.
pub fn next_interval(stability: f64) -> i32 {
    let raw = stability / FACTOR * (REQUEST_RETENTION.powf(1.0 / DECAY) - 1.0);
    (raw.round() as i32).clamp(1, MAX_INTERVAL_DAYS)
}

pub fn next_difficulty(difficulty: f64, rating: Rating) -> f64 {
    let shifted = difficulty - w(6) * (grade(rating) - 3.0);
    let reverted = w(7) * init_difficulty(Rating::Easy) + (1.0 - w(7)) * shifted;
    clamp_difficulty(reverted)
}

pub fn next_recall_stability(difficulty: f64, stability: f64, r: f64, rating: Rating) -> f64 {
    let hard_penalty = if rating == Rating::Hard { w(15) } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { w(16) } else { 1.0 };
    stability
        * (w(8).exp()
            * (11.0 - difficulty)
            * stability.powf(-w(9))
            * ((w(10) * (1.0 - r)).exp() - 1.0)
            * hard_penalty
            * easy_bonus
            + 1.0)
}

pub fn next_forget_stability(difficulty: f64, stability: f64, r: f64) -> f64 {
    let s = w(11)
        * difficulty.powf(-w(12))
        * ((stability + 1.0).powf(w(13)) - 1.0)
        * (w(14) * (1.0 - r)).exp();
    s.min(stability).max(MIN_STABILITY)
}

/// SM-2 style ease kept on FSRS cards so both algorithms share one column.
pub fn ease_from_difficulty(difficulty: f64) -> i32 {
    let ease = (f64::from(INITIAL_EASE_FACTOR) * (1.0 - difficulty / 10.0)).round() as i32;
    ease.max(MIN_EASE_FACTOR)
}

pub fn schedule(current: &SchedulingState, rating: Rating, now: EpochMillis) -> Transition {
    match current.state {
        CardState::New => schedule_new(rating, now),
        CardState::Learning | CardState::Relearning => schedule_learning(current, rating, now),
        CardState::Review => schedule_review(current, rating, now),
    }
}

fn schedule_new(rating: Rating, now: EpochMillis) -> Transition {
    let stability = init_stability(rating);
    let difficulty = init_difficulty(rating);
    match rating {
        Rating::Again => step(CardState::Learning, now + NEW_AGAIN_STEP_MS, stability, difficulty),
        Rating::Hard => step(CardState::Learning, now + NEW_HARD_STEP_MS, stability, difficulty),
        Rating::Good => step(CardState::Learning, now + NEW_GOOD_STEP_MS, stability, difficulty),
        Rating::Easy => review(next_interval(stability), now, stability, difficulty),
    }
}

fn schedule_learning(current: &SchedulingState, rating: Rating, now: EpochMillis) -> Transition {
    let (last_s, last_d) = memory_or_default(current);
    let r = retrievability(elapsed_days(current, now), last_s);
    let difficulty = next_difficulty(last_d, rating);
    let stability = if rating == Rating::Again {
        next_forget_stability(last_d, last_s, r)
    } else {
        next_recall_stability(last_d, last_s, r, rating)
    };

    match rating {
        Rating::Again => step(current.state, now + LEARNING_AGAIN_STEP_MS, stability, difficulty),
        Rating::Hard => step(current.state, now + LEARNING_HARD_STEP_MS, stability, difficulty),
        Rating::Good => review(next_interval(stability), now, stability, difficulty),
        Rating::Easy => {
            let good_s = next_recall_stability(last_d, last_s, r, Rating::Good);
            let interval = next_interval(stability).max(next_interval(good_s) + 1);
            review(interval.min(MAX_INTERVAL_DAYS), now, stability, difficulty)
        }
    }
}

fn schedule_review(current: &SchedulingState, rating: Rating, now: EpochMillis) -> Transition {
    let (last_s, last_d) = memory_or_default(current);
    let r = retrievability(elapsed_days(current, now), last_s);
    let difficulty = next_difficulty(last_d, rating);

    if rating == Rating::Again {
        let stability = next_forget_stability(last_d, last_s, r);
        return step(
            CardState::Relearning,
            now + LEARNING_AGAIN_STEP_MS,
            stability,
            difficulty,
        );
    }

    // Compute all three so the intervals stay ordered hard <= good < easy.
    let hard_s = next_recall_stability(last_d, last_s, r, Rating::Hard);
    let good_s = next_recall_stability(last_d, last_s, r, Rating::Good);
    let easy_s = next_recall_stability(last_d, last_s, r, Rating::Easy);

    let mut hard_i = next_interval(hard_s);
    let mut good_i = next_interval(good_s);
    hard_i = hard_i.min(good_i);
    good_i = good_i.max(hard_i + 1).min(MAX_INTERVAL_DAYS);
    let easy_i = next_interval(easy_s).max(good_i + 1).min(MAX_INTERVAL_DAYS);

    match rating {
        Rating::Hard => review(hard_i, now, hard_s, difficulty),
        Rating::Good => review(good_i, now, good_s, difficulty),
        _ => review(easy_i, now, easy_s, difficulty),
    }
}

/// Cards that were reviewed under SM-2 carry no memory state; derive one
/// from their interval.
fn memory_or_default(current: &SchedulingState) -> (f64, f64) {
    let stability = if current.stability > 0.0 {
        current.stability
    } else {
        f64::from(current.interval.max(1))
    };
    let difficulty = if current.difficulty > 0.0 {
        clamp_difficulty(current.difficulty)
    } else {
        init_difficulty(Rating::Good)
    };
    (stability, difficulty)
}

fn elapsed_days(current: &SchedulingState, now: EpochMillis) -> f64 {
    match current.last_review {
        Some(last) if now > last => (now - last) as f64 / DAY_MS as f64,
        _ => 0.0,
    }
}

fn step(state: CardState, due: EpochMillis, stability: f64, difficulty: f64) -> Transition {
    Transition {
        state,
        queue: CardQueue::Learning,
        due,
        interval: 0,
        ease_factor: ease_from_difficulty(difficulty),
        stability,
        difficulty,
    }
}

fn review(interval: i32, now: EpochMillis, stability: f64, difficulty: f64) -> Transition {
    Transition {
        state: CardState::Review,
        queue: CardQueue::Review,
        due: now + i64::from(interval) * DAY_MS,
        interval,
        ease_factor: ease_from_difficulty(difficulty),
        stability,
        difficulty,
    }
}
