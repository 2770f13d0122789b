//! `GET /greet?name=<str>&mode=<str>` — contextual greeting.
//!
//! `name` is form-decoded and defaults to `World`. `mode` is taken raw (no
//! decoding) and defaults to the current runtime mode. Each call claims the
//! next visitor number.

use std::{borrow::Cow, sync::Arc};

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;

use super::text;
use crate::{greeting, query, state::AppState};

pub async fn greet(State(state): State<Arc<AppState>>, RawQuery(raw): RawQuery) -> Response {
    let raw = raw.as_deref();
    let name = query::decoded_param(raw, "name").unwrap_or(Cow::Borrowed(greeting::DEFAULT_NAME));

    let current = state.mode.get();
    let requested_mode = query::raw_param(raw, "mode").unwrap_or(current.as_str());

    let visitor = state.metrics.next_visitor();
    let body = greeting::generate(
        &name,
        visitor,
        requested_mode,
        current,
        &state.identity,
        Utc::now(),
    );
    text(StatusCode::OK, body)
}
