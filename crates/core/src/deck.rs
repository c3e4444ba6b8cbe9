//! Deck input validation.

use crate::error::CoreError;
use crate::scheduler::SchedulerKind;

pub const MAX_DECK_NAME_LEN: usize = 100;
pub const MAX_DECK_DESCRIPTION_LEN: usize = 500;

/// Validate a deck name (non-blank, <= 100 chars).
pub fn validate_deck_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("Deck name must not be empty".into()));
    }
    if name.chars().count() > MAX_DECK_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Deck name must be at most {MAX_DECK_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_deck_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DECK_DESCRIPTION_LEN {
        return Err(CoreError::Validation(format!(
            "Deck description must be at most {MAX_DECK_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

/// Parse and normalise a scheduler name (`sm2`, `fsrs`, or the legacy
/// `fsrs_v4` / `fsrs_v5` aliases) to its stored form.
pub fn normalize_scheduler(name: &str) -> Result<&'static str, CoreError> {
    name.parse::<SchedulerKind>().map(SchedulerKind::as_str)
}
