//! Review statistics helpers.

use chrono::{Datelike, Duration, NaiveTime, TimeZone, Utc};

use crate::types::{EpochMillis, Timestamp};

/// Lowest rating that counts as a successful recall for retention.
pub const RETAINED_MIN_RATING: i16 = 3;

/// Start of the current UTC day and the current ISO week (Monday), in epoch
/// milliseconds.
pub fn period_starts(now: Timestamp) -> (EpochMillis, EpochMillis) {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    let today = Utc.from_utc_datetime(&midnight);
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    let week = today - Duration::days(days_since_monday);
    (today.timestamp_millis(), week.timestamp_millis())
}
