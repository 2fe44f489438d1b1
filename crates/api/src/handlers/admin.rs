//! Handlers for the admin dashboard and the spreadsheet export.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use gathering_core::dashboard::{DashboardPage, DashboardView};
use gathering_core::error::CoreError;
use gathering_core::notice::{StatusNotice, MSG_NOTHING_TO_EXPORT};
use gathering_core::stats::{distinct_groups, summarize, Summary};
use gathering_db::repositories::RegistrationRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::export_flow::{run_export, ExportOutcome};
use crate::query::DashboardParams;
use crate::response::{DataResponse, NoticeResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse<'a> {
    #[serde(flatten)]
    pub page: DashboardPage<'a>,
    pub filter_active: bool,
    pub summary: Summary,
    /// Groups present in the data, for the filter menu.
    pub groups: Vec<String>,
    pub sheet_url: Option<String>,
}

/// GET /api/v1/admin/dashboard
///
/// Load every registration, then filter and paginate in memory.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> AppResult<Response> {
    let filter = params.filter()?;
    let registrations = RegistrationRepo::list(&state.pool).await?;

    let mut view = DashboardView::new(state.config.dashboard_page_size);
    view.set_filter(filter);
    if let Some(page) = params.page {
        view.set_page(page);
    }

    let response = DashboardResponse {
        page: view.render(&registrations),
        filter_active: view.filter().is_active(),
        summary: summarize(&registrations),
        groups: distinct_groups(&registrations),
        sheet_url: state.config.sheets_view_url.clone(),
    };

    Ok(Json(DataResponse { data: response }).into_response())
}

/// POST /api/v1/admin/export
///
/// Push every unexported registration to the spreadsheet and flag them.
/// Returns 409 while another export is running and 503 when no webhook is
/// configured.
pub async fn export_to_sheet(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let exporter = state.exporter.as_deref().ok_or_else(|| {
        AppError::Unavailable("Spreadsheet webhook is not configured".to_string())
    })?;

    let _in_flight = state.export_lock.try_lock().map_err(|_| {
        AppError::Core(CoreError::Conflict(
            "An export is already in progress".to_string(),
        ))
    })?;

    let outcome = run_export(&state.pool, exporter, &state.config).await?;

    let clear_after_ms = state.config.notice_clear_ms;
    let notice = match &outcome {
        ExportOutcome::NothingToExport => {
            StatusNotice::success(MSG_NOTHING_TO_EXPORT, clear_after_ms)
        }
        ExportOutcome::Exported { registrations, .. } => {
            StatusNotice::exported(*registrations, clear_after_ms)
        }
    };

    Ok(Json(NoticeResponse {
        data: outcome,
        notice,
    }))
}
