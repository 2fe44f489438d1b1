use std::time::Duration;

use chrono::FixedOffset;
use gathering_core::dashboard::DEFAULT_PAGE_SIZE;
use gathering_core::export::{display_offset, DEFAULT_DISPLAY_OFFSET_HOURS};
use gathering_core::notice::DEFAULT_NOTICE_CLEAR_MS;
use gathering_sheets::{ATTEMPT_TIMEOUT, RETRY_DELAYS_SECS};

/// Time kept back from the request timeout for the store work around an
/// export (listing before, flagging after).
const EXPORT_DEADLINE_MARGIN_SECS: u64 = 5;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// spreadsheet URLs, which stay unset unless provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Spreadsheet web-app URL receiving exports. Export is disabled when unset.
    pub sheets_webhook_url: Option<String>,
    /// Timeout for one webhook attempt (default: `10`).
    pub export_attempt_timeout_secs: u64,
    /// Delays between webhook attempts (default: `1,2,4`).
    pub export_retry_delays_secs: Vec<u64>,
    /// Link to the spreadsheet itself, passed through to the dashboard.
    pub sheets_view_url: Option<String>,
    /// Offset used to render `createdAt` in exported rows (default: UTC+8).
    pub display_offset: FixedOffset,
    /// Rows per dashboard page (default: `10`).
    pub dashboard_page_size: usize,
    /// Delay before clients clear a status notice (default: `3000`).
    pub notice_clear_ms: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                    |
    /// |----------------------------|----------------------------|
    /// | `HOST`                     | `0.0.0.0`                  |
    /// | `PORT`                     | `3000`                     |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                       |
    /// | `SHEETS_WEBHOOK_URL`       | unset                      |
    /// | `EXPORT_ATTEMPT_TIMEOUT_SECS` | `10`                    |
    /// | `EXPORT_RETRY_DELAYS_SECS` | `1,2,4`                    |
    /// | `SHEETS_VIEW_URL`          | unset                      |
    /// | `DISPLAY_UTC_OFFSET_HOURS` | `8`                        |
    /// | `DASHBOARD_PAGE_SIZE`      | `10`                       |
    /// | `NOTICE_CLEAR_MS`          | `3000`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let sheets_webhook_url = non_empty_var("SHEETS_WEBHOOK_URL");
        let sheets_view_url = non_empty_var("SHEETS_VIEW_URL");

        let export_attempt_timeout_secs: u64 = std::env::var("EXPORT_ATTEMPT_TIMEOUT_SECS")
            .unwrap_or_else(|_| ATTEMPT_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("EXPORT_ATTEMPT_TIMEOUT_SECS must be a valid u64");

        let export_retry_delays_secs: Vec<u64> = match std::env::var("EXPORT_RETRY_DELAYS_SECS") {
            Ok(v) => v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse()
                        .expect("EXPORT_RETRY_DELAYS_SECS must be comma-separated u64 values")
                })
                .collect(),
            Err(_) => RETRY_DELAYS_SECS.to_vec(),
        };

        let offset_hours: i32 = std::env::var("DISPLAY_UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| DEFAULT_DISPLAY_OFFSET_HOURS.to_string())
            .parse()
            .expect("DISPLAY_UTC_OFFSET_HOURS must be a valid i32");
        let display_offset = display_offset(offset_hours)
            .expect("DISPLAY_UTC_OFFSET_HOURS must be between -23 and 23");

        let dashboard_page_size: usize = std::env::var("DASHBOARD_PAGE_SIZE")
            .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .expect("DASHBOARD_PAGE_SIZE must be a valid usize");

        let notice_clear_ms: u64 = std::env::var("NOTICE_CLEAR_MS")
            .unwrap_or_else(|_| DEFAULT_NOTICE_CLEAR_MS.to_string())
            .parse()
            .expect("NOTICE_CLEAR_MS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            sheets_webhook_url,
            export_attempt_timeout_secs,
            export_retry_delays_secs,
            sheets_view_url,
            display_offset,
            dashboard_page_size,
            notice_clear_ms,
        }
    }

    /// Budget for one whole export, retries included. Keeps the export
    /// inside the request timeout with room left for flagging the rows.
    pub fn export_deadline(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .saturating_sub(EXPORT_DEADLINE_MARGIN_SECS)
            .max(1);
        Duration::from_secs(secs)
    }

    pub fn export_retry_delays(&self) -> Vec<Duration> {
        self.export_retry_delays_secs
            .iter()
            .map(|s| Duration::from_secs(*s))
            .collect()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
