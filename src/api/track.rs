//! Request-counting middleware.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Count the request against its path (query string excluded) once the
/// handler or fallback has built its response and before it is written.
/// A `/metrics` body therefore never includes the request rendering it.
/// Applied once on the service router, so each request is recorded exactly
/// once.
pub async fn track_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;
    state.metrics.record(&path);
    response
}
