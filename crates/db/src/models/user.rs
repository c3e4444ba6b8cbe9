//! User entity model and DTOs.

use deckhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    /// `"user"` or `"admin"`.
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user. `role` defaults to `"user"`.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub role: Option<String>,
}
