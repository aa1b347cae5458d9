//! Tap-to-measure rate tracker for heartbeat and footstep rhythms.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Sliding-window settings for [`RhythmTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RhythmConfig {
    /// Number of most recent taps averaged.
    pub window: usize,
    /// Taps needed before a rate is reported.
    pub min_taps: usize,
}

impl Default for RhythmConfig {
    fn default() -> Self {
        Self {
            window: 5,
            min_taps: 3,
        }
    }
}

impl RhythmConfig {
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.min_taps < 2 {
            return Err(ValidationError::InvalidConfig {
                reason: format!("rhythm.min_taps must be at least 2, got {}", self.min_taps),
            });
        }
        if self.window < 2 {
            return Err(ValidationError::InvalidConfig {
                reason: format!("rhythm.window must be at least 2, got {}", self.window),
            });
        }
        Ok(())
    }
}

/// Converts taps in time with a sound into a per-minute rate.
///
/// The rate is `round(60000 / mean interval in ms)` over the last `window`
/// taps and is only reported once `min_taps` taps have been recorded.
#[derive(Debug, Clone)]
pub struct RhythmTracker {
    cfg: RhythmConfig,
    taps: VecDeque<Instant>,
    total: usize,
    rate: Option<u32>,
}

impl Default for RhythmTracker {
    fn default() -> Self {
        Self::new(RhythmConfig::default())
    }
}

impl RhythmTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new(cfg: RhythmConfig) -> Self {
        Self {
            cfg,
            taps: VecDeque::with_capacity(cfg.window.max(2)),
            total: 0,
            rate: None,
        }
    }

    /// Record a tap now.
    pub fn tap_now(&mut self) -> Option<u32> {
        self.tap(Instant::now())
    }

    /// Record a tap at `at` and return the current rate, if any.
    ///
    /// Taps must be given in non-decreasing time order.
    pub fn tap(&mut self, at: Instant) -> Option<u32> {
        if self.taps.len() == self.cfg.window.max(2) {
            self.taps.pop_front();
        }
        self.taps.push_back(at);
        self.total += 1;

        if self.total >= self.cfg.min_taps {
            if let Some(rate) = self.compute() {
                self.rate = Some(rate);
            }
        }
        self.rate
    }

    fn compute(&self) -> Option<u32> {
        let first = *self.taps.front()?;
        let last = *self.taps.back()?;
        let intervals = self.taps.len().checked_sub(1).filter(|n| *n > 0)?;

        #[allow(clippy::cast_precision_loss)]
        let mean_ms = last.duration_since(first).as_secs_f64() * 1000.0 / intervals as f64;
        if mean_ms <= 0.0 {
            return None;
        }

        let rate = (60_000.0 / mean_ms).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(rate.min(f64::from(u32::MAX)) as u32)
    }

    /// Last reported rate.
    #[must_use]
    pub const fn rate(&self) -> Option<u32> {
        self.rate
    }

    /// Taps recorded since the last reset.
    #[must_use]
    pub const fn tap_count(&self) -> usize {
        self.total
    }

    /// Forget every tap and the rate.
    pub fn reset(&mut self) {
        self.taps.clear();
        self.total = 0;
        self.rate = None;
    }
}
