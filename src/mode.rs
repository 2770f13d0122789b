//! Process-wide runtime mode.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// Operational flag distinguishing normal operation from simulated
/// degradation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Normal,
    Chaos,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Chaos => "chaos",
        }
    }

    fn to_u8(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Chaos => 1,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Chaos,
            _ => Self::Normal,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free holder for the current [`Mode`].
///
/// Reads and writes use acquire/release ordering, so a `set` on one worker is
/// observed by every later `get` on any other worker.
#[derive(Debug, Default)]
pub struct ModeController {
    current: AtomicU8,
}

impl ModeController {
    pub fn new(initial: Mode) -> Self {
        Self {
            current: AtomicU8::new(initial.to_u8()),
        }
    }

    pub fn get(&self) -> Mode {
        Mode::from_u8(self.current.load(Ordering::Acquire))
    }

    /// Overwrite the mode, returning the previous value.
    pub fn set(&self, mode: Mode) -> Mode {
        Mode::from_u8(self.current.swap(mode.to_u8(), Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn starts_in_normal_mode() {
        assert_eq!(ModeController::default().get(), Mode::Normal);
    }

    #[test]
    fn set_is_visible_and_idempotent() {
        let mode = ModeController::new(Mode::Normal);
        assert_eq!(mode.set(Mode::Chaos), Mode::Normal);
        assert_eq!(mode.get(), Mode::Chaos);
        assert_eq!(mode.set(Mode::Chaos), Mode::Chaos);
        assert_eq!(mode.get(), Mode::Chaos);
    }

    #[test]
    fn display_and_serde_use_lowercase_names() {
        assert_eq!(Mode::Normal.to_string(), "normal");
        assert_eq!(Mode::Chaos.to_string(), "chaos");
        assert_eq!(serde_json::to_string(&Mode::Chaos).unwrap(), "\"chaos\"");
    }

    #[test]
    fn write_on_one_thread_is_seen_by_another() {
        let mode = Arc::new(ModeController::default());

        let writer = {
            let mode = Arc::clone(&mode);
            thread::spawn(move || mode.set(Mode::Chaos))
        };
        writer.join().unwrap();

        let reader = {
            let mode = Arc::clone(&mode);
            thread::spawn(move || mode.get())
        };
        assert_eq!(reader.join().unwrap(), Mode::Chaos);
    }
}
