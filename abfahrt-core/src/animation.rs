//! Blink animation phase
//!
//! Departures that are due or one minute away blink. The phase clock runs
//! on its own interval, independent of fetches and of the display model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Countdown at or below which a departure blinks
pub const BLINK_THRESHOLD_MIN: u16 = 1;

/// Blink glyph visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnimationPhase {
    Visible,
    Hidden,
}

impl AnimationPhase {
    pub fn toggled(self) -> Self {
        match self {
            AnimationPhase::Visible => AnimationPhase::Hidden,
            AnimationPhase::Hidden => AnimationPhase::Visible,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, AnimationPhase::Visible)
    }
}

/// Whether a departure gets a blink glyph
pub fn should_blink(countdown_min: u16, due: bool) -> bool {
    due || countdown_min <= BLINK_THRESHOLD_MIN
}

/// Phase clock
#[derive(Debug, Clone)]
pub struct AnimationState {
    phase: AnimationPhase,
    interval_ms: u64,
    /// Monotonic time of the last toggle (ms)
    last_toggle_ms: u64,
}

impl AnimationState {
    pub fn new(interval_s: u32, now_ms: u64) -> Self {
        Self {
            phase: AnimationPhase::Visible,
            interval_ms: u64::from(interval_s) * 1000,
            last_toggle_ms: now_ms,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Advance the clock; returns true if the phase changed
    ///
    /// A late tick toggles once and re-anchors at `now_ms`, it does not
    /// replay missed toggles.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.interval_ms == 0 || now_ms.saturating_sub(self.last_toggle_ms) < self.interval_ms {
            return false;
        }
        self.phase = self.phase.toggled();
        self.last_toggle_ms = now_ms;
        true
    }

    /// Monotonic time of the next phase change
    pub fn next_toggle_ms(&self) -> u64 {
        self.last_toggle_ms.saturating_add(self.interval_ms)
    }
}
