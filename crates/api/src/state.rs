use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and config are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: deckhub_db::DbPool,
    /// Server configuration (the auth extractor reads the JWT settings).
    pub config: Arc<ServerConfig>,
}
