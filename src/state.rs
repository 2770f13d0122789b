//! Shared service state injected into every request handler via
//! [`axum::extract::State`].

use std::sync::Arc;

use crate::{
    chaos::{ChaosController, ProcessExit, StdProcessExit},
    config::Config,
    identity::ServiceIdentity,
    metrics::MetricsRegistry,
    mode::{Mode, ModeController},
};

/// Everything a handler may read or mutate.
///
/// `identity` is immutable; `metrics` and `mode` are lock-free and may be
/// touched from any worker. There is no invariant spanning `mode` and
/// `metrics`, so they are updated independently.
#[derive(Debug)]
pub struct AppState {
    pub identity: ServiceIdentity,
    pub metrics: MetricsRegistry,
    pub mode: ModeController,
    pub chaos: ChaosController,
}

impl AppState {
    /// Build state for a real process: crashes call [`std::process::exit`].
    pub fn new(config: &Config) -> Self {
        Self::with_exit(config, Arc::new(StdProcessExit))
    }

    pub fn with_exit(config: &Config, exit: Arc<dyn ProcessExit>) -> Self {
        Self {
            identity: ServiceIdentity::new(&config.service),
            metrics: MetricsRegistry::new(),
            mode: ModeController::new(Mode::Normal),
            chaos: ChaosController::new(exit, config.server.crash_delay()),
        }
    }
}
