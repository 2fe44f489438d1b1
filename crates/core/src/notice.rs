//! Transient status messages returned with every admin mutation.
//!
//! Clients display a notice and clear it after `clear_after_ms`.

use serde::Serialize;

/// Default delay before a notice is cleared.
pub const DEFAULT_NOTICE_CLEAR_MS: u64 = 3000;

pub const MSG_UPDATED: &str = "資料已更新";
pub const MSG_UPDATE_FAILED: &str = "更新失敗";
pub const MSG_DELETED: &str = "資料已刪除";
pub const MSG_DELETE_FAILED: &str = "刪除失敗";
pub const MSG_NOTHING_TO_EXPORT: &str = "沒有新資料需要匯出";
pub const MSG_EXPORT_FAILED: &str = "匯出失敗，請稍後再試";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusNotice {
    pub kind: NoticeKind,
    pub message: String,
    pub clear_after_ms: u64,
}

impl StatusNotice {
    pub fn success(message: impl Into<String>, clear_after_ms: u64) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            clear_after_ms,
        }
    }

    pub fn error(message: impl Into<String>, clear_after_ms: u64) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            clear_after_ms,
        }
    }

    /// Notice for a completed export of `count` registrations.
    pub fn exported(count: usize, clear_after_ms: u64) -> Self {
        Self::success(
            format!("成功匯出 {count} 筆資料到 Google Sheets！"),
            clear_after_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_message_includes_count() {
        let notice = StatusNotice::exported(3, DEFAULT_NOTICE_CLEAR_MS);
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "成功匯出 3 筆資料到 Google Sheets！");
    }

    #[test]
    fn serializes_kind_snake_case() {
        let json = serde_json::to_value(StatusNotice::error(MSG_DELETE_FAILED, 3000)).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["clear_after_ms"], 3000);
    }
}
