pub mod admin;
pub mod health;
pub mod navigation;
pub mod registrations;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /groups                                          platinum groups (GET)
///
/// /registrations                                   list, submit form
/// /registrations/unexported                        not yet exported (GET)
/// /registrations/stats                             per-group stats (GET)
/// /registrations/mark-exported                     flag as exported (POST)
/// /registrations/{id}                              get, edit, delete
/// /registrations/{id}/delete-prompt                confirmation text (GET)
///
/// /admin/dashboard                                 filtered, paginated list (GET)
/// /admin/export                                    export to spreadsheet (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(handlers::registrations::list_groups))
        .nest("/registrations", registrations::router())
        .nest("/admin", admin::router())
}
