use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gathering_core::error::CoreError;
use gathering_core::notice::StatusNotice;
use gathering_sheets::ExportError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds store, export and
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// `{ "error", "code" }` JSON bodies; failed store mutations and exports add
/// an error `notice`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `gathering_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The spreadsheet webhook could not be reached or refused the batch.
    /// `clear_after_ms` is the delay for the error notice.
    #[error("Export error: {source}")]
    Export {
        source: ExportError,
        clear_after_ms: u64,
    },

    /// A store mutation failed; `message` is the user-facing text.
    #[error("{message}: {source}")]
    OperationFailed {
        message: &'static str,
        source: sqlx::Error,
        clear_after_ms: u64,
    },

    /// A required collaborator is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Wrap a failed store mutation with its user-facing message and the
    /// notice delay.
    pub fn operation(
        message: &'static str,
        clear_after_ms: u64,
    ) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::OperationFailed {
            message,
            source,
            clear_after_ms,
        }
    }

    /// Wrap a failed export with the notice delay.
    pub fn export(clear_after_ms: u64) -> impl FnOnce(ExportError) -> AppError {
        move |source| AppError::Export {
            source,
            clear_after_ms,
        }
    }

    fn notice_delay(&self) -> Option<u64> {
        match self {
            AppError::OperationFailed { clear_after_ms, .. }
            | AppError::Export { clear_after_ms, .. } => Some(*clear_after_ms),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Store errors ---
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::OperationFailed { message, source, .. } => {
                tracing::error!(error = %source, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "OPERATION_FAILED",
                    message.to_string(),
                )
            }

            // --- Export errors ---
            AppError::Export { source: err, .. } => {
                tracing::error!(error = %err, "Spreadsheet export failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXPORT_FAILED",
                    format!("匯出失敗：{err}"),
                )
            }

            // --- HTTP-specific errors ---
            AppError::Unavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
        };

        // Failed admin mutations also carry an error notice for the client.
        let body = match self.notice_delay() {
            Some(clear_after_ms) => json!({
                "error": message,
                "code": code,
                "notice": StatusNotice::error(message.clone(), clear_after_ms),
            }),
            None => json!({
                "error": message,
                "code": code,
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Check constraint violations (`ck_` prefix) map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL check constraint violation: error code 23514
            if db_err.code().as_deref() == Some("23514") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("ck_") {
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        format!("Value violates constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        let resp = AppError::Core(CoreError::Validation("bad".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id: uuid::Uuid::nil(),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn export_maps_to_502() {
        let resp = AppError::export(3000)(ExportError::HttpStatus(500)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn operation_failed_maps_to_500() {
        let err = AppError::operation("刪除失敗", 3000)(sqlx::Error::PoolTimedOut);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn error_notice_uses_given_delay() {
        let resp =
            AppError::operation("刪除失敗", 500)(sqlx::Error::PoolTimedOut).into_response();
        let json = body_json(resp).await;
        assert_eq!(json["notice"]["kind"], "error");
        assert_eq!(json["notice"]["message"], "刪除失敗");
        assert_eq!(json["notice"]["clear_after_ms"], 500);

        let resp = AppError::export(750)(ExportError::HttpStatus(503)).into_response();
        assert_eq!(body_json(resp).await["notice"]["clear_after_ms"], 750);
    }

    #[tokio::test]
    async fn validation_error_has_no_notice() {
        let resp = AppError::Core(CoreError::Validation("bad".into())).into_response();
        assert!(body_json(resp).await.get("notice").is_none());
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let resp = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
