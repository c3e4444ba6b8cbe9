/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Milliseconds since the Unix epoch. Card `due` / `last_review` and review
/// log times are stored in this unit.
pub type EpochMillis = i64;
