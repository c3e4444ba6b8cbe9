use axum::routing::get;
use axum::Router;

use crate::handlers::review_log;
use crate::state::AppState;

/// Routes mounted at `/review-logs`.
///
/// ```text
/// GET    /          -> list
/// GET    /stats     -> stats
/// GET    /{id}      -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(review_log::list))
        .route("/stats", get(review_log::stats))
        .route("/{id}", get(review_log::get_by_id))
}
