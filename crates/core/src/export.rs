//! Spreadsheet row preparation.
//!
//! Flattens registrations into one row per member. [`SheetRow`] serializes
//! with the spreadsheet's camelCase column names.

use chrono::{Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::registration::Registration;
use crate::types::Timestamp;

/// Display offset used when none is configured (Taipei, UTC+8).
pub const DEFAULT_DISPLAY_OFFSET_HOURS: i32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub platinum_group: String,
    pub leader_name: String,
    pub friend_name: String,
    pub gender: String,
    pub created_at: String,
}

/// One row per member, in registration order then member order.
pub fn prepare_sheet_data(registrations: &[Registration], offset: FixedOffset) -> Vec<SheetRow> {
    registrations
        .iter()
        .flat_map(|reg| {
            let created_at = format_locale_timestamp(reg.created_at, offset);
            reg.new_friends.iter().map(move |friend| SheetRow {
                platinum_group: reg.platinum_group.clone(),
                leader_name: reg.leader_name.clone(),
                friend_name: friend.name.clone(),
                gender: friend.gender.label().to_string(),
                created_at: created_at.clone(),
            })
        })
        .collect()
}

/// Render a timestamp the way the zh-TW locale prints a date-time:
/// `2024/1/5 下午3:04:05`.
pub fn format_locale_timestamp(ts: Timestamp, offset: FixedOffset) -> String {
    let local = ts.with_timezone(&offset);
    let (is_pm, hour) = local.hour12();
    let period = if is_pm { "下午" } else { "上午" };
    format!(
        "{}/{}/{} {}{}:{:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        period,
        hour,
        local.minute(),
        local.second()
    )
}

/// Build a fixed display offset from whole hours east of UTC.
///
/// Returns `None` for offsets outside ±23 hours.
pub fn display_offset(hours: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(hours.checked_mul(3600)?)
}
