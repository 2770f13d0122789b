//! Fault injection driven by `/chaos?action=…`.
//!
//! Directives and their effect:
//!
//! | action    | effect                                                |
//! |-----------|-------------------------------------------------------|
//! | `enable`  | mode → [`Mode::Chaos`]                                |
//! | `disable` | mode → [`Mode::Normal`]                               |
//! | `crash`   | answer 200, then exit the process after a fixed delay |
//! | anything else, or absent | answer 503, no state change            |
//!
//! The crash timer runs on a dedicated OS thread rather than a tokio task, so
//! it fires even if the runtime is shutting down and nothing in the service
//! holds a handle that could cancel it. Once scheduled it cannot be revoked.
//! A production service would leave termination to its supervisor (e.g. a
//! signal from the orchestrator) instead of killing itself.

use std::{sync::Arc, thread, time::Duration};

use tracing::{debug, error, info, warn};

use crate::mode::{Mode, ModeController};

/// Exit status used when the crash timer fires.
pub const CRASH_EXIT_CODE: i32 = 1;

/// A parsed `action` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosAction {
    Enable,
    Disable,
    Crash,
    /// Absent, empty or unrecognised. Matching is case-sensitive.
    Unknown,
}

impl ChaosAction {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("enable") => Self::Enable,
            Some("disable") => Self::Disable,
            Some("crash") => Self::Crash,
            _ => Self::Unknown,
        }
    }
}

/// What applying a [`ChaosAction`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosOutcome {
    ModeChanged(Mode),
    CrashScheduled(Duration),
    /// Simulated degraded dependency; nothing changed.
    Degraded,
}

/// Terminates the process. Abstracted so tests can observe a crash without
/// losing the test binary.
pub trait ProcessExit: Send + Sync + 'static {
    fn exit(&self, code: i32);
}

/// [`ProcessExit`] backed by [`std::process::exit`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdProcessExit;

impl ProcessExit for StdProcessExit {
    fn exit(&self, code: i32) {
        std::process::exit(code)
    }
}

/// Applies chaos directives to the shared mode and owns crash scheduling.
#[derive(Clone)]
pub struct ChaosController {
    exit: Arc<dyn ProcessExit>,
    crash_delay: Duration,
}

impl ChaosController {
    pub fn new(exit: Arc<dyn ProcessExit>, crash_delay: Duration) -> Self {
        Self { exit, crash_delay }
    }

    pub fn crash_delay(&self) -> Duration {
        self.crash_delay
    }

    /// `request_id` identifies the triggering request in the crash log line.
    pub fn apply(
        &self,
        action: ChaosAction,
        mode: &ModeController,
        request_id: Option<&str>,
    ) -> ChaosOutcome {
        match action {
            ChaosAction::Enable => self.transition(mode, Mode::Chaos),
            ChaosAction::Disable => self.transition(mode, Mode::Normal),
            ChaosAction::Crash => {
                self.schedule_crash(request_id);
                ChaosOutcome::CrashScheduled(self.crash_delay)
            }
            ChaosAction::Unknown => {
                debug!("unrecognised chaos action, reporting degraded");
                ChaosOutcome::Degraded
            }
        }
    }

    fn transition(&self, mode: &ModeController, to: Mode) -> ChaosOutcome {
        let from = mode.set(to);
        if from != to {
            info!(%from, %to, "runtime mode changed");
        }
        ChaosOutcome::ModeChanged(to)
    }

    /// Fire-and-forget: start the detached timer thread and return at once.
    fn schedule_crash(&self, request_id: Option<&str>) {
        let exit = Arc::clone(&self.exit);
        let delay = self.crash_delay;
        warn!(
            request_id = request_id.unwrap_or("-"),
            delay_ms = delay.as_millis() as u64,
            "crash requested, process will exit"
        );

        let spawned = thread::Builder::new()
            .name("crash-timer".into())
            .spawn(move || {
                thread::sleep(delay);
                error!(code = CRASH_EXIT_CODE, "simulated crash, exiting");
                exit.exit(CRASH_EXIT_CODE);
            });

        if let Err(e) = spawned {
            // Without a timer thread the only faithful option is exiting now.
            error!(error = %e, "could not start crash timer, exiting immediately");
            self.exit.exit(CRASH_EXIT_CODE);
        }
    }
}

impl std::fmt::Debug for ChaosController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaosController")
            .field("crash_delay", &self.crash_delay)
            .finish_non_exhaustive()
    }
}
