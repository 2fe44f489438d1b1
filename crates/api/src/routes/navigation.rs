//! Site navigation index served at `/`.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub path: &'static str,
    pub label: &'static str,
}

/// The site's pages in menu order.
pub const NAV_ENTRIES: [NavEntry; 5] = [
    NavEntry { path: "/", label: "首頁" },
    NavEntry { path: "/register", label: "住宿登記表" },
    NavEntry { path: "/admin", label: "住宿列表" },
    NavEntry { path: "/game", label: "遊戲大廳" },
    NavEntry { path: "/animals", label: "讀動物挑戰" },
];

async fn navigation() -> Json<DataResponse<&'static [NavEntry]>> {
    Json(DataResponse { data: &NAV_ENTRIES })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(navigation))
}
