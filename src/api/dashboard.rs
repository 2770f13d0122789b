//! `GET /` — the single-page demo dashboard.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

const HTML: &str = include_str!("dashboard.html");

pub async fn dashboard() -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/html; charset=utf-8")], HTML)
}
