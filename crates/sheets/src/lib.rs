//! Spreadsheet export over a webhook, with exponential-backoff retry.
//!
//! [`SheetsExporter`] POSTs `{"action": "addData", "data": [...rows]}` to a
//! spreadsheet web-app URL. The HTTP status is checked and non-2xx responses
//! count as failures; the response body is never read. A 2xx therefore means
//! the webhook accepted the batch, not that the spreadsheet was updated.
//!
//! Every attempt carries an `Idempotency-Key` derived from the ids of the
//! registrations in the batch (see [`batch_key`]). Retries within one export
//! and a later re-export of the same registrations send the same key, so a
//! webhook that honours it can drop repeats. Delivery is at-least-once.

use std::time::Duration;

use gathering_core::export::SheetRow;
use gathering_core::types::DocId;
use serde::Serialize;
use tokio::time::Instant;

/// Retry delays in seconds (exponential backoff: 1s, 2s, 4s).
pub const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// HTTP request timeout for a single delivery attempt.
pub const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the per-batch key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Action name the spreadsheet web app dispatches on.
const ADD_DATA_ACTION: &str = "addData";

/// Namespace for batch keys.
const BATCH_KEY_NAMESPACE: uuid::Uuid =
    uuid::Uuid::from_u128(0x6a0e_5b1c_2f4d_4e8a_9c3b_7d21_f0a4_8e55);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for export delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Payload / receipt
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct AddDataRequest<'a> {
    action: &'static str,
    data: &'a [SheetRow],
}

/// Proof that a batch was accepted by the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReceipt {
    pub batch_id: uuid::Uuid,
    pub rows: usize,
    pub attempts: usize,
}

/// Stable key for a batch of registrations.
///
/// A name-based UUID over the sorted, de-duplicated ids: the same set of
/// registrations always yields the same key, whatever the order.
pub fn batch_key(ids: &[DocId]) -> uuid::Uuid {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let name: Vec<u8> = sorted.iter().flat_map(|id| *id.as_bytes()).collect();
    uuid::Uuid::new_v5(&BATCH_KEY_NAMESPACE, &name)
}

// ---------------------------------------------------------------------------
// SheetsExporter
// ---------------------------------------------------------------------------

/// Pushes sheet rows to a spreadsheet webhook.
#[derive(Debug, Clone)]
pub struct SheetsExporter {
    client: reqwest::Client,
    webhook_url: String,
    retry_delays: Vec<Duration>,
    attempt_timeout: Duration,
    /// Upper bound on one whole export, retries included.
    deadline: Option<Duration>,
}

impl SheetsExporter {
    /// Create an exporter for `webhook_url` with the default retry schedule
    /// and no overall deadline.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            retry_delays: RETRY_DELAYS_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
            attempt_timeout: ATTEMPT_TIMEOUT,
            deadline: None,
        })
    }

    /// Replace the retry schedule. An empty schedule means a single attempt.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Bound the whole export. No retry is started that could not finish
    /// in time, and the last attempt is cut short at the deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Deliver a batch of rows under `batch_id`, retrying on failure.
    ///
    /// Returns the receipt of the first successful attempt, or the error of
    /// the last attempt once the schedule or the deadline is exhausted.
    pub async fn export(
        &self,
        batch_id: uuid::Uuid,
        rows: &[SheetRow],
    ) -> Result<ExportReceipt, ExportError> {
        let payload = AddDataRequest {
            action: ADD_DATA_ACTION,
            data: rows,
        };
        let deadline = self.deadline.map(|d| Instant::now() + d);

        let max_attempts = self.retry_delays.len() + 1;
        let mut attempt = 0;
        loop {
            attempt += 1;
            let timeout = match deadline {
                Some(deadline) => self
                    .attempt_timeout
                    .min(deadline.saturating_duration_since(Instant::now())),
                None => self.attempt_timeout,
            };
            let error = match self.try_send(&payload, batch_id, timeout).await {
                Ok(()) => {
                    tracing::info!(%batch_id, rows = rows.len(), attempt, "Sheet export accepted");
                    return Ok(ExportReceipt {
                        batch_id,
                        rows: rows.len(),
                        attempts: attempt,
                    });
                }
                Err(e) => e,
            };

            let next_delay = self.retry_delays.get(attempt - 1).copied();
            let retry = match (next_delay, deadline) {
                (None, _) => None,
                // Only retry if the wait leaves room for a useful attempt.
                (Some(delay), Some(deadline)) if Instant::now() + delay >= deadline => None,
                (Some(delay), _) => Some(delay),
            };

            match retry {
                Some(delay) => {
                    tracing::warn!(
                        %batch_id,
                        attempt,
                        error = %error,
                        "Sheet export attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(
                        %batch_id,
                        attempts = attempt,
                        max_attempts,
                        error = %error,
                        "Sheet export failed, giving up"
                    );
                    return Err(error);
                }
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(
        &self,
        payload: &AddDataRequest<'_>,
        batch_id: uuid::Uuid,
        timeout: Duration,
    ) -> Result<(), ExportError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .timeout(timeout)
            .header(IDEMPOTENCY_KEY_HEADER, batch_id.to_string())
            .json(payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ExportError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
