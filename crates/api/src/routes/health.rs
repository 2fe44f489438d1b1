use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the registration store answers.
    pub db_healthy: bool,
    /// Whether a spreadsheet webhook is configured.
    pub export_configured: bool,
}

/// GET /health -- service, store and export status.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = gathering_db::health_check(&state.pool).await.is_ok();
    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        export_configured: state.exporter.is_some(),
    })
}

/// Mount at the root, not under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
