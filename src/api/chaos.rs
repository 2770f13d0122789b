//! `GET /chaos?action=<enable|disable|crash>` — operator fault injection.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::Response,
    Extension,
};

use super::{request_id::RequestId, text};
use crate::{
    chaos::{ChaosAction, ChaosOutcome},
    mode::Mode,
    query,
    state::AppState,
};

/// Apply the `action` directive.
///
/// `crash` schedules the exit before the response is written; the timer is
/// long enough for the reply to reach the client first. Unknown or missing
/// actions answer `503` to mimic a degraded dependency.
pub async fn chaos(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    RawQuery(raw): RawQuery,
) -> Response {
    let action = ChaosAction::parse(query::raw_param(raw.as_deref(), "action"));

    match state.chaos.apply(action, &state.mode, Some(&request_id.0)) {
        ChaosOutcome::ModeChanged(Mode::Chaos) => text(StatusCode::OK, "Chaos mode enabled\n"),
        ChaosOutcome::ModeChanged(Mode::Normal) => text(StatusCode::OK, "Chaos mode disabled\n"),
        ChaosOutcome::CrashScheduled(delay) => text(
            StatusCode::OK,
            format!("Crashing in {} seconds...\n", whole_seconds(delay)),
        ),
        ChaosOutcome::Degraded => text(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service degraded (chaos mode)\n",
        ),
    }
}

/// Seconds rounded up, so sub-second delays never read "0 seconds".
fn whole_seconds(delay: Duration) -> u64 {
    let secs = delay.as_secs();
    if delay.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
