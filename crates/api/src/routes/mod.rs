pub mod admin;
pub mod card;
pub mod deck;
pub mod health;
pub mod note;
pub mod note_model;
pub mod review_log;
pub mod shared_deck;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /decks                                  list, create
/// /decks/{id}                             get, update, delete
/// /decks/{id}/publish                     first publish (POST)
/// /decks/{id}/notes                       list, create
/// /decks/{id}/notes/batch                 batch create (POST)
/// /decks/{id}/cards                       list with filters
///
/// /note-models                            list, create
/// /note-models/{id}                       get, update, delete
/// /note-models/{id}/templates             list, create templates
/// /note-models/{id}/templates/{tid}       get, update, delete template
///
/// /notes/{id}                             get, update, delete
///
/// /cards/due                              study queue, suspended excluded
/// /cards/stats                            counts per state
/// /cards/{id}                             get
/// /cards/{id}/suspend                     suspend (POST)
/// /cards/{id}/unsuspend                   unsuspend (POST)
/// /cards/{id}/review                      review (POST)
///
/// /review-logs                            list
/// /review-logs/stats                      aggregate stats
/// /review-logs/{id}                       get
///
/// /shared-decks                           search (public)
/// /shared-decks/{slug}                    detail (public)
/// /shared-decks/{slug}/download           latest snapshot (public)
/// /shared-decks/{id}                      update, delete (author)
/// /shared-decks/{id}/snapshots            snapshot history
/// /shared-decks/{id}/snapshots/{version}  one snapshot
/// /shared-decks/{id}/republish            republish (POST, author)
///
/// /admin/stats                            system counts (admin)
/// /admin/shared-decks                     list incl. inactive (admin)
/// /admin/shared-decks/{id}/flags          featured / official / active (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/decks", deck::router())
        .nest("/note-models", note_model::router())
        .nest("/notes", note::router())
        .nest("/cards", card::router())
        .nest("/review-logs", review_log::router())
        .nest("/shared-decks", shared_deck::router())
        .nest("/admin", admin::router())
}
