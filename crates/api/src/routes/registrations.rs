//! Route definitions for registrations, mounted at `/registrations`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::registrations;
use crate::state::AppState;

/// ```text
/// GET    /                    -> list_registrations
/// POST   /                    -> create_registration
/// GET    /unexported          -> list_unexported
/// GET    /stats               -> registration_stats
/// POST   /mark-exported       -> mark_exported
/// GET    /{id}                -> get_registration
/// PUT    /{id}                -> update_registration
/// DELETE /{id}                -> delete_registration
/// GET    /{id}/delete-prompt  -> delete_prompt
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(registrations::list_registrations).post(registrations::create_registration),
        )
        .route("/unexported", get(registrations::list_unexported))
        .route("/stats", get(registrations::registration_stats))
        .route("/mark-exported", post(registrations::mark_exported))
        .route(
            "/{id}",
            get(registrations::get_registration)
                .put(registrations::update_registration)
                .delete(registrations::delete_registration),
        )
        .route("/{id}/delete-prompt", get(registrations::delete_prompt))
}
