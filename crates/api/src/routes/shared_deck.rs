//! Route definitions for the `/shared-decks` marketplace.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::shared_deck;
use crate::state::AppState;

/// Routes mounted at `/shared-decks`.
///
/// The second segment is a slug on the public reads and a numeric id on
/// the authenticated routes; one parameter name covers both because
/// `GET /{key}` and `PUT /{key}` are the same route.
///
/// ```text
/// GET    /                    -> search
/// GET    /{key}               -> get_by_slug
/// PUT    /{key}               -> update
/// DELETE /{key}               -> delete
/// GET    /{key}/download      -> download
/// GET    /{key}/snapshots     -> list_snapshots
/// GET    /{key}/snapshots/{version} -> get_snapshot
/// POST   /{key}/republish     -> republish
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(shared_deck::search))
        .route(
            "/{key}",
            get(shared_deck::get_by_slug)
                .put(shared_deck::update)
                .delete(shared_deck::delete),
        )
        .route("/{key}/download", get(shared_deck::download))
        .route("/{key}/snapshots", get(shared_deck::list_snapshots))
        .route(
            "/{key}/snapshots/{version}",
            get(shared_deck::get_snapshot),
        )
        .route("/{key}/republish", post(shared_deck::republish))
}
