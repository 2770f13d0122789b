//! Liveness and readiness probes.
//!
//! Both endpoints have no dependencies and never block, so orchestrator
//! probes keep passing even while chaos mode is on. Only a crash makes them
//! stop answering.

use axum::{http::StatusCode, response::Response};

use super::text;

/// `GET /healthz` — always `200 ok`.
pub async fn healthz() -> Response {
    text(StatusCode::OK, "ok\n")
}

/// `GET /readyz` — always `200 ready`.
pub async fn readyz() -> Response {
    text(StatusCode::OK, "ready\n")
}
