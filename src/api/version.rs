//! `GET /version` — build and runtime metadata as JSON.
//!
//! Example response:
//! ```json
//! {
//!   "service": "harness-ci-lab",
//!   "version": "1.4.2",
//!   "gitSha": "9f1c2ab",
//!   "podName": "harness-ci-lab-5c8d-q7wz",
//!   "instanceId": "0123abcd-5e6f-4a1b-9c2d-3e4f5a6b7c8d",
//!   "uptimeSeconds": 3600,
//!   "mode": "normal"
//! }
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{mode::Mode, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo<'a> {
    pub service: &'a str,
    pub version: &'a str,
    pub git_sha: &'a str,
    pub pod_name: &'a str,
    pub instance_id: &'a str,
    pub uptime_seconds: u64,
    pub mode: Mode,
}

impl<'a> VersionInfo<'a> {
    pub fn from_state(state: &'a AppState) -> Self {
        let id = &state.identity;
        Self {
            service: &id.service,
            version: &id.version,
            git_sha: &id.git_sha,
            pod_name: &id.pod_name,
            instance_id: &id.instance_id,
            uptime_seconds: id.uptime_secs(),
            mode: state.mode.get(),
        }
    }
}

pub async fn version(State(state): State<Arc<AppState>>) -> Response {
    // Serialised here, while the borrow of `state` is still alive.
    let mut resp = Json(VersionInfo::from_state(&state)).into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    resp
}
