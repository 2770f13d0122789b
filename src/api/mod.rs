//! HTTP surface of harness-ci-lab.
//!
//! Handlers are thin: they pull what they need from [`AppState`] and the raw
//! query string, call into the domain modules, and pick a status code. Every
//! request, including unmatched paths, is counted by [`track`] and carries an
//! `X-Request-ID` from [`request_id`].

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::state::AppState;

pub mod chaos;
pub mod dashboard;
pub mod greet;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod track;
pub mod version;

pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/version", get(version::version))
        .route("/metrics", get(metrics::metrics))
        .route("/greet", get(greet::greet))
        .route("/chaos", get(chaos::chaos))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            track::track_middleware,
        ))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

/// Plain-text response with the UTF-8 content type every text endpoint uses.
pub(crate) fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body.into()).into_response()
}

async fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, "not found\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // oneshot

    use crate::{
        chaos::{tests::RecordingExit, CRASH_EXIT_CODE},
        config::Config,
        mode::Mode,
        state::AppState,
    };

    // -----------------------------------------------------------------------
    // Test helpers
    // -----------------------------------------------------------------------

    pub(crate) fn test_state() -> Arc<AppState> {
        let (exit, _rx) = RecordingExit::new();
        Arc::new(AppState::with_exit(&Config::default(), exit))
    }

    pub(crate) async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let req = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn app() -> (Router, Arc<AppState>) {
        let state = test_state();
        (super::router(Arc::clone(&state)), state)
    }

    // -----------------------------------------------------------------------
    // End-to-end scenarios
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn pirate_greeting_for_first_visitor() {
        let (app, _) = app();
        let (status, body) = get(&app, "/greet?name=John&mode=pirate").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Ahoy, John!"), "body: {body}");
        assert!(body.contains("You are visitor #1"), "body: {body}");
        assert!(body.contains("Greeting Mode: pirate"), "body: {body}");
    }

    #[tokio::test]
    async fn metrics_after_one_health_and_one_ready_check() {
        let (app, _) = app();
        get(&app, "/healthz").await;
        get(&app, "/readyz").await;

        let (_, body) = get(&app, "/metrics").await;
        assert!(body.contains("requests_total 2\n"), "body: {body}");
        assert!(body.contains("requests_by_path{path=\"/healthz\"} 1\n"), "body: {body}");
        assert!(body.contains("requests_by_path{path=\"/readyz\"} 1\n"), "body: {body}");
    }

    #[tokio::test]
    async fn chaos_toggle_is_reported_by_version() {
        let (app, _) = app();

        get(&app, "/chaos?action=enable").await;
        let (_, body) = get(&app, "/version").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["mode"], "chaos");

        get(&app, "/chaos?action=disable").await;
        let (_, body) = get(&app, "/version").await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["mode"], "normal");
    }

    #[tokio::test]
    async fn greet_defaults_follow_current_mode() {
        let (app, _) = app();
        let (_, body) = get(&app, "/greet").await;
        assert!(body.starts_with("Hello, World!"), "body: {body}");
        assert!(body.contains("Greeting Mode: normal\n"));

        get(&app, "/chaos?action=enable").await;
        let (_, body) = get(&app, "/greet").await;
        assert!(body.contains("Greeting Mode: chaos\n"), "body: {body}");
        assert!(body.contains("App Mode: chaos\n"), "body: {body}");
    }

    #[tokio::test]
    async fn crash_answers_then_exits_after_delay() {
        let mut config = Config::default();
        config.server.crash_delay_ms = 20;
        let (exit, rx) = RecordingExit::new();
        let state = Arc::new(AppState::with_exit(&config, exit));
        let app = super::router(Arc::clone(&state));

        let (status, body) = get(&app, "/chaos?action=crash").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("Crashing in"), "body: {body}");

        let code = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .expect("crash timer never fired");
        assert_eq!(code, CRASH_EXIT_CODE);
        assert_eq!(state.mode.get(), Mode::Normal);
    }

    // -----------------------------------------------------------------------
    // Tracking
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn query_string_is_not_part_of_the_path_key() {
        let (app, state) = app();
        get(&app, "/greet?name=a").await;
        get(&app, "/greet?name=b&mode=pirate").await;

        let snap = state.metrics.snapshot();
        assert_eq!(snap.requests_by_path.len(), 1);
        assert_eq!(snap.requests_by_path["/greet"], 2);
        assert_eq!(snap.greet_visitors, 2);
    }

    #[tokio::test]
    async fn unknown_paths_get_404_and_are_still_counted() {
        let (app, state) = app();
        let (status, _) = get(&app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let snap = state.metrics.snapshot();
        assert_eq!(snap.requests_total, 1);
        assert_eq!(snap.requests_by_path["/nope"], 1);
    }

    #[tokio::test]
    async fn favicon_is_counted_in_total_but_hidden_from_path_lines() {
        let (app, _) = app();
        get(&app, "/favicon.ico").await;

        let (_, body) = get(&app, "/metrics").await;
        assert!(body.contains("requests_total 1\n"), "body: {body}");
        assert!(!body.contains("favicon"), "body: {body}");
    }

    #[tokio::test]
    async fn metrics_body_excludes_its_own_request() {
        let (app, state) = app();

        let (_, first) = get(&app, "/metrics").await;
        assert!(first.contains("requests_total 0\n"), "body: {first}");
        assert!(!first.contains("/metrics"), "body: {first}");

        // Counted once the response is built, so the next scrape sees it
        assert_eq!(state.metrics.snapshot().requests_by_path["/metrics"], 1);
        let (_, second) = get(&app, "/metrics").await;
        assert!(second.contains("requests_total 1\n"), "body: {second}");
        assert!(second.contains("requests_by_path{path=\"/metrics\"} 1\n"), "body: {second}");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let (app, _) = app();
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn rejected_chaos_action_is_counted_once() {
        let (app, state) = app();
        let (status, _) = get(&app, "/chaos?action=bogus").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(state.metrics.snapshot().requests_by_path["/chaos"], 1);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_keep_counters_consistent() {
        const ROUNDS: usize = 50;
        let (app, state) = app();
        let uris = [
            "/healthz",
            "/readyz",
            "/greet?name=x",
            "/version",
            "/chaos?action=enable",
            "/chaos?action=disable",
            "/unknown",
        ];

        let mut tasks = Vec::new();
        for _ in 0..ROUNDS {
            for uri in uris {
                let app = app.clone();
                tasks.push(tokio::spawn(async move { get(&app, uri).await }));
            }
        }
        for t in tasks {
            t.await.unwrap();
        }

        let snap = state.metrics.snapshot();
        assert_eq!(snap.requests_total, (ROUNDS * uris.len()) as u64);
        assert_eq!(snap.requests_by_path.values().sum::<u64>(), snap.requests_total);
        assert_eq!(snap.requests_by_path["/chaos"], (ROUNDS * 2) as u64);
        assert_eq!(snap.greet_visitors, ROUNDS as u64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_greets_get_distinct_visitor_numbers() {
        let (app, _) = app();
        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move { get(&app, "/greet").await.1 })
            })
            .collect();

        let mut numbers = Vec::new();
        for t in tasks {
            let body = t.await.unwrap();
            let n: u64 = body
                .lines()
                .find_map(|l| l.strip_prefix("You are visitor #"))
                .and_then(|n| n.parse().ok())
                .expect("visitor line present");
            numbers.push(n);
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=100).collect::<Vec<u64>>());
    }
}
