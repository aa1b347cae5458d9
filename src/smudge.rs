//! Countdown of a ghost's hunt-suppression window after smudging.

use std::fmt;
use std::time::Duration;

use crate::catalog::Ghost;

/// Pausable countdown driven by the caller's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmudgeTimer {
    duration: Duration,
    remaining: Duration,
    running: bool,
    finished: bool,
}

impl SmudgeTimer {
    /// Stopped timer of the given length.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: duration,
            running: false,
            finished: false,
        }
    }

    /// Timer for `ghost`'s smudge window.
    #[must_use]
    pub fn for_ghost(ghost: &Ghost) -> Self {
        Self::new(Duration::from_secs(u64::from(ghost.smudge_seconds)))
    }

    /// Start or resume. A finished timer restarts from the full duration.
    pub fn start(&mut self) {
        if self.remaining.is_zero() {
            self.remaining = self.duration;
            self.finished = false;
        }
        self.running = true;
    }

    /// Stop counting without losing progress.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and rewind to the full duration.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration);
    }

    /// Advance by `elapsed`. Returns true on the tick that finishes the timer.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            self.running = false;
            self.finished = true;
            return true;
        }
        false
    }

    /// Time left.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// True while counting down.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// True once the window has passed and the ghost can hunt again.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Elapsed fraction in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        1.0 - self.remaining.as_secs_f64() / self.duration.as_secs_f64()
    }
}

impl fmt::Display for SmudgeTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.remaining.as_secs() + u64::from(self.remaining.subsec_nanos() > 0);
        write!(f, "{}:{:02}", secs / 60, secs % 60)
    }
}
