//! Refresh scheduler state machine
//!
//! Planning and committing are separate steps. `plan` picks a decision
//! and the successor `RefreshState` without applying it; `complete`
//! applies it once the panel accepted the draw, `abandon` discards it.
//! A failed draw therefore leaves the counters exactly as they were and
//! the next cycle asks for the same draw again.

use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scheduler states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    /// Nothing in flight
    Idle,
    /// Partial data redraw planned, waiting for the driver
    PartialPending,
    /// Full data redraw planned, waiting for the driver
    FullPending,
}

/// Draw decided for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawDecision {
    /// Redraw everything with the full waveform
    DrawFull,
    /// Redraw everything with the partial waveform
    DrawPartial,
    /// Redraw only the blink glyphs
    DrawAnimationRegion,
    /// Leave the panel alone
    NoOp,
}

/// Counters persisting across cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefreshState {
    /// Partial data redraws since the last full one
    pub partial_count: u16,
    /// Data redraws between full refreshes
    pub full_refresh_interval: u16,
    /// Next draw must be full (manual request or power-on)
    pub force_full: bool,
}

/// Inputs sampled once per cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshInputs {
    /// Display model changed since the last completed data draw
    pub data_ready: bool,
    /// Blink phase changed and blinking rows are on screen
    pub animation_due: bool,
}

/// Planned draw with the state to commit on success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct RefreshPlan {
    decision: DrawDecision,
    next: RefreshState,
}

/// Refresh scheduler
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    state: SchedulerState,
    refresh: RefreshState,
    pending: Option<RefreshPlan>,
}

impl RefreshScheduler {
    /// Create a scheduler; the first draw after power-on is full
    pub fn new(full_refresh_interval: u16) -> Self {
        Self {
            state: SchedulerState::Idle,
            refresh: RefreshState {
                partial_count: 0,
                full_refresh_interval,
                force_full: true,
            },
            pending: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.refresh
    }

    /// Check if nothing is in flight
    pub fn is_idle(&self) -> bool {
        self.state == SchedulerState::Idle && self.pending.is_none()
    }

    /// Ask for a full redraw on the next cycle
    pub fn request_full(&mut self) {
        self.refresh.force_full = true;
    }

    /// Decide this cycle's draw
    ///
    /// Priority: forced full, then data, then animation, then nothing.
    /// Nothing is committed until `complete`.
    pub fn plan(&mut self, inputs: RefreshInputs) -> DrawDecision {
        if let Some(stale) = self.pending.take() {
            warn!("refresh: replanning over unfinished {:?}", stale.decision);
        }

        let current = self.refresh;
        let (decision, next, state) = if current.force_full {
            let next = RefreshState {
                partial_count: 0,
                force_full: false,
                ..current
            };
            (DrawDecision::DrawFull, next, SchedulerState::FullPending)
        } else if inputs.data_ready {
            let count = current.partial_count.saturating_add(1);
            if count >= current.full_refresh_interval {
                let next = RefreshState {
                    partial_count: 0,
                    ..current
                };
                (DrawDecision::DrawFull, next, SchedulerState::FullPending)
            } else {
                let next = RefreshState {
                    partial_count: count,
                    ..current
                };
                (DrawDecision::DrawPartial, next, SchedulerState::PartialPending)
            }
        } else if inputs.animation_due {
            (DrawDecision::DrawAnimationRegion, current, SchedulerState::Idle)
        } else {
            (DrawDecision::NoOp, current, SchedulerState::Idle)
        };

        self.state = state;
        if decision != DrawDecision::NoOp {
            self.pending = Some(RefreshPlan { decision, next });
        }
        debug!(
            "refresh: {:?} (partial {} -> {})",
            decision, current.partial_count, next.partial_count
        );
        decision
    }

    /// The planned draw reached the panel; commit its state
    pub fn complete(&mut self) {
        if let Some(plan) = self.pending.take() {
            self.refresh = plan.next;
        }
        self.state = SchedulerState::Idle;
    }

    /// The planned draw was given up; keep the previous state
    pub fn abandon(&mut self) {
        self.pending = None;
        self.state = SchedulerState::Idle;
    }
}
