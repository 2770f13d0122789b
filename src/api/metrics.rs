//! Prometheus-ish `/metrics` endpoint.
//!
//! The output is line-oriented `name value` text, close enough to the
//! Prometheus exposition format for dashboards and `grep`, without `HELP` or
//! `TYPE` metadata. Lines, in order:
//!
//! - `service_uptime_seconds` — whole seconds since start
//! - `requests_total`         — every request, all paths
//! - `greet_visitors_total`   — `/greet` calls
//! - `requests_by_path{path="…"}` — one per observed path, sorted
//!
//! `/favicon.ico` still counts toward `requests_total` but gets no
//! per-path line, so the two do not add up whenever a browser asked for it.

use std::{fmt::Write as _, sync::Arc};

use axum::{extract::State, http::StatusCode, response::Response};

use super::text;
use crate::{metrics::MetricsSnapshot, state::AppState};

const HIDDEN_PATHS: &[&str] = &["/favicon.ico"];

/// `GET /metrics`
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let uptime = state.identity.uptime_secs();
    let snapshot = state.metrics.snapshot();
    text(StatusCode::OK, render(uptime, &snapshot))
}

pub fn render(uptime_secs: u64, snap: &MetricsSnapshot) -> String {
    let mut out = String::with_capacity(128 + snap.requests_by_path.len() * 48);

    let _ = writeln!(out, "service_uptime_seconds {uptime_secs}");
    let _ = writeln!(out, "requests_total {}", snap.requests_total);
    let _ = writeln!(out, "greet_visitors_total {}", snap.greet_visitors);

    for (path, count) in &snap.requests_by_path {
        if HIDDEN_PATHS.contains(&path.as_str()) {
            continue;
        }
        let _ = writeln!(out, "requests_by_path{{path=\"{path}\"}} {count}");
    }

    out
}
