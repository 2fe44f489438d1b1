//! Export of unexported registrations to the spreadsheet.
//!
//! 1. Fetch the unexported registrations.
//! 2. Flatten them into one sheet row per member.
//! 3. Deliver the rows through the webhook.
//! 4. Flag exactly the registrations fetched in step 1 as exported.
//!
//! Nothing is flagged unless step 3 succeeded. Registrations created while
//! the export runs are left for the next export. Step 4 is one atomic
//! statement, so a failure there leaves every row unflagged; the rows were
//! delivered, and the next export will send them again under the same
//! batch key, since the key is derived from the registration ids.

use std::time::Duration;

use gathering_core::export::prepare_sheet_data;
use gathering_core::notice::MSG_EXPORT_FAILED;
use gathering_core::types::DocId;
use gathering_db::repositories::RegistrationRepo;
use gathering_db::DbPool;
use gathering_sheets::{batch_key, ExportError, SheetsExporter};
use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// Every registration was already exported.
    NothingToExport,
    Exported {
        /// Registrations included in the batch.
        registrations: usize,
        /// Sheet rows sent (one per member).
        rows: usize,
        /// Registrations flagged as exported.
        marked: u64,
        batch_id: uuid::Uuid,
        attempts: usize,
    },
}

/// Build the exporter from config, or `None` when no webhook is set.
///
/// The whole retry schedule is bounded by [`ServerConfig::export_deadline`],
/// so a failing webhook is given up on before the request times out.
pub fn build_exporter(config: &ServerConfig) -> Result<Option<SheetsExporter>, ExportError> {
    let Some(url) = config.sheets_webhook_url.as_deref() else {
        return Ok(None);
    };

    let exporter = SheetsExporter::new(url)?
        .with_retry_delays(config.export_retry_delays())
        .with_attempt_timeout(Duration::from_secs(config.export_attempt_timeout_secs))
        .with_deadline(config.export_deadline());

    Ok(Some(exporter))
}

pub async fn run_export(
    pool: &DbPool,
    exporter: &SheetsExporter,
    config: &ServerConfig,
) -> AppResult<ExportOutcome> {
    let clear_after_ms = config.notice_clear_ms;

    let unexported = RegistrationRepo::list_unexported(pool).await?;
    if unexported.is_empty() {
        tracing::info!("No unexported registrations");
        return Ok(ExportOutcome::NothingToExport);
    }

    let ids: Vec<DocId> = unexported.iter().map(|r| r.id).collect();
    let rows = prepare_sheet_data(&unexported, config.display_offset);
    let receipt = exporter
        .export(batch_key(&ids), &rows)
        .await
        .map_err(AppError::export(clear_after_ms))?;

    let marked = RegistrationRepo::mark_as_exported(pool, &ids)
        .await
        .map_err(|e| {
            tracing::error!(
                batch_id = %receipt.batch_id,
                count = ids.len(),
                "Rows delivered but registrations could not be flagged as exported",
            );
            AppError::operation(MSG_EXPORT_FAILED, clear_after_ms)(e)
        })?;

    tracing::info!(
        batch_id = %receipt.batch_id,
        registrations = unexported.len(),
        rows = rows.len(),
        marked,
        "Registrations exported",
    );

    Ok(ExportOutcome::Exported {
        registrations: unexported.len(),
        rows: rows.len(),
        marked,
        batch_id: receipt.batch_id,
        attempts: receipt.attempts,
    })
}
