use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Every handler requires the admin role.
///
/// ```text
/// GET    /stats                      -> stats
/// GET    /shared-decks               -> list_shared_decks
/// PUT    /shared-decks/{id}/flags    -> set_shared_deck_flags
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/shared-decks", get(admin::list_shared_decks))
        .route(
            "/shared-decks/{id}/flags",
            put(admin::set_shared_deck_flags),
        )
}
