//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity is mutable

pub mod card;
pub mod deck;
pub mod note;
pub mod note_model;
pub mod review_log;
pub mod shared_deck;
pub mod stats;
pub mod user;
