//! Resource ownership checks.
//!
//! Callers look the resource up first so that a missing id yields
//! `NotFound`; only an existing resource owned by someone else yields
//! `Forbidden`.

use crate::error::CoreError;
use crate::types::DbId;

/// Ensure `caller_id` owns the resource whose owner is `owner_id`.
///
/// `entity` is a lowercase noun used in the error message
/// (e.g. `"deck"`, `"shared deck"`).
pub fn ensure_owner(entity: &str, owner_id: DbId, caller_id: DbId) -> Result<(), CoreError> {
    if owner_id != caller_id {
        return Err(CoreError::Forbidden(format!(
            "You do not have permission to access this {entity}"
        )));
    }
    Ok(())
}
