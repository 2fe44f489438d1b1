//! Query parameter types for API handlers.

use gathering_core::dashboard::{DashboardFilter, ExportStatusFilter};
use gathering_core::error::CoreError;
use serde::Deserialize;

/// Dashboard parameters (`?group=&leader=&export_status=&page=`).
///
/// `group` and `export_status` accept `all` (or nothing) to disable the
/// predicate. `page` is 1-based and clamped when rendering.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub group: Option<String>,
    pub leader: Option<String>,
    pub export_status: Option<String>,
    pub page: Option<usize>,
}

impl DashboardParams {
    pub fn filter(&self) -> Result<DashboardFilter, CoreError> {
        let group = self
            .group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != "all")
            .map(str::to_string);

        let leader = self
            .leader
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let export_status = match self.export_status.as_deref().map(str::trim) {
            None | Some("") => ExportStatusFilter::All,
            Some(s) => s.parse()?,
        };

        Ok(DashboardFilter {
            group,
            leader,
            export_status,
        })
    }
}
