use std::sync::Arc;

use gathering_sheets::SheetsExporter;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and everything else sits
/// behind an `Arc`. Built once in `main` and handed to the router.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (the registration store).
    pub pool: gathering_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Spreadsheet exporter; `None` when no webhook URL is configured.
    pub exporter: Option<Arc<SheetsExporter>>,
    /// Held for the duration of an export so overlapping exports are refused.
    pub export_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        pool: gathering_db::DbPool,
        config: ServerConfig,
        exporter: Option<SheetsExporter>,
    ) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            exporter: exporter.map(Arc::new),
            export_lock: Arc::new(Mutex::new(())),
        }
    }
}
