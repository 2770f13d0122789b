use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::signal;
use tracing::info;

mod api;
mod chaos;
mod config;
mod error;
mod greeting;
mod identity;
mod metrics;
mod mode;
mod query;
mod state;

pub use config::Config;
pub use state::AppState;

const DEFAULT_LOG_FILTER: &str = "harness_ci_lab=info,tower_http=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // When invoked as a container HEALTHCHECK, hit /healthz and exit immediately.
    // This avoids needing any external tool (curl/wget) in the image.
    if std::env::args().nth(1).as_deref() == Some("--healthcheck") {
        return healthcheck().await;
    }

    let config = Config::load().context("loading configuration")?;

    // Initialise tracing; RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    config.server.log_level.as_deref().unwrap_or(DEFAULT_LOG_FILTER),
                )
            }),
        )
        .init();

    let state = Arc::new(AppState::new(&config));
    info!(
        service = %state.identity.service,
        version = %state.identity.version,
        git_sha = %state.identity.git_sha,
        pod = %state.identity.pod_name,
        instance_id = %state.identity.instance_id,
        crash_delay_ms = state.chaos.crash_delay().as_millis() as u64,
        "harness-ci-lab starting"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Server started on port {}", config.server.port);

    let trace_layer = tower_http::trace::TraceLayer::new_for_http()
        .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
        .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO));

    let app = api::router(state).layer(trace_layer);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

/// Lightweight healthcheck: GET /healthz and exit 0 on 2xx, 1 otherwise.
/// Invoked via `harness-ci-lab --healthcheck` from a container HEALTHCHECK.
async fn healthcheck() -> anyhow::Result<()> {
    let port = Config::load().context("loading configuration")?.server.port;
    let healthy = probe(&format!("http://127.0.0.1:{port}/healthz")).await?;
    std::process::exit(if healthy { 0 } else { 1 });
}

async fn probe(url: &str) -> anyhow::Result<bool> {
    let resp = reqwest::get(url)
        .await
        .with_context(|| format!("requesting {url}"))?;
    Ok(resp.status().is_success())
}
