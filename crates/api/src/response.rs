//! Response envelopes.
//!
//! Reads return `{ "data": ... }`. Admin mutations return
//! `{ "data": ..., "notice": {...} }` so the client can show the transient
//! status message and clear it after `notice.clear_after_ms`.

use gathering_core::notice::StatusNotice;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "notice": StatusNotice }` for admin mutations.
#[derive(Debug, Serialize)]
pub struct NoticeResponse<T: Serialize> {
    pub data: T,
    pub notice: StatusNotice,
}
