//! Route definitions for the `/note-models` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::note_model;
use crate::state::AppState;

/// Routes mounted at `/note-models`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> delete
/// GET    /{id}/templates                     -> list_templates
/// POST   /{id}/templates                     -> create_template
/// GET    /{id}/templates/{template_id}       -> get_template
/// PUT    /{id}/templates/{template_id}       -> update_template
/// DELETE /{id}/templates/{template_id}       -> delete_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(note_model::list).post(note_model::create))
        .route(
            "/{id}",
            get(note_model::get_by_id)
                .put(note_model::update)
                .delete(note_model::delete),
        )
        .route(
            "/{id}/templates",
            get(note_model::list_templates).post(note_model::create_template),
        )
        .route(
            "/{id}/templates/{template_id}",
            get(note_model::get_template)
                .put(note_model::update_template)
                .delete(note_model::delete_template),
        )
}
