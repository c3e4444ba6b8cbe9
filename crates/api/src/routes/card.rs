use axum::routing::{get, post};
use axum::Router;

use crate::handlers::card;
use crate::state::AppState;

/// Routes mounted at `/cards`.
///
/// ```text
/// GET    /due              -> list_due
/// GET    /stats            -> stats
/// GET    /{id}             -> get_by_id
/// POST   /{id}/suspend     -> suspend
/// POST   /{id}/unsuspend   -> unsuspend
/// POST   /{id}/review      -> review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/due", get(card::list_due))
        .route("/stats", get(card::stats))
        .route("/{id}", get(card::get_by_id))
        .route("/{id}/suspend", post(card::suspend))
        .route("/{id}/unsuspend", post(card::unsuspend))
        .route("/{id}/review", post(card::review))
}
