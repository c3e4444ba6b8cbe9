//! Route definitions for the `/decks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{card, deck, note, shared_deck};
use crate::state::AppState;

/// Routes mounted at `/decks`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete
/// POST   /{id}/publish        -> shared_deck::publish
/// GET    /{id}/notes          -> note::list_by_deck
/// POST   /{id}/notes          -> note::create
/// POST   /{id}/notes/batch    -> note::create_batch
/// GET    /{id}/cards          -> card::list_by_deck
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(deck::list).post(deck::create))
        .route(
            "/{id}",
            get(deck::get_by_id).put(deck::update).delete(deck::delete),
        )
        .route("/{id}/publish", post(shared_deck::publish))
        .route("/{id}/notes", get(note::list_by_deck).post(note::create))
        .route("/{id}/notes/batch", post(note::create_batch))
        .route("/{id}/cards", get(card::list_by_deck))
}
