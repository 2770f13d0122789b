//! Request ID middleware.
//!
//! Every inbound request is assigned an `X-Request-ID`:
//!
//! - accepted from the caller when already present (e.g. from an ingress)
//! - otherwise a fresh UUID v4
//!
//! The ID is stored as a [`RequestId`] extension, echoed in the response
//! header, and attached to a [`tracing`] span wrapping the handler so log
//! lines from probes and chaos actions can be matched to ingress logs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Instrument as _;
use uuid::Uuid;

const HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Applied by [`crate::api::router`]; `main` wraps the router in
/// `TraceLayer`, so the span nests under the request span.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::debug_span!("request_id", id = %id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::Request,
        middleware,
        routing::get,
        Extension, Router,
    };
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn generates_uuid_when_header_missing() {
        let resp = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let id = resp.headers()[HEADER].to_str().unwrap().to_owned();
        assert!(Uuid::parse_str(&id).is_ok(), "not a uuid: {id}");

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, id.as_bytes());
    }

    #[tokio::test]
    async fn echoes_caller_supplied_id() {
        let req = Request::builder()
            .uri("/")
            .header(HEADER, "ingress-42")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[HEADER], "ingress-42");
    }
}
