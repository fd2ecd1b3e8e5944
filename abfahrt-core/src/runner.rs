//! Cooperative cycle runner
//!
//! One loop, one fetch and one draw in flight at most. The watchdog is fed
//! immediately before and after every call that can block: the fetch,
//! each draw attempt, each backoff delay, and the idle sleep.

use embedded_hal::delay::DelayNs;
use log::{error, warn};

use crate::engine::{CoreState, RenderCommand};
use crate::error::HardwareError;
use crate::health::{FaultKind, HealthStatus};
use crate::render::{DrawKind, RegionWrite};
use crate::traits::{Buttons, Clock, CommitKind, DepartureSource, DisplayDriver, StatusLed, Watchdog};

/// Attempts per draw before it is skipped for the cycle
pub const DRAW_ATTEMPTS: u8 = 3;

/// Delay before the first retry; doubles per attempt
pub const BACKOFF_BASE_MS: u32 = 200;

/// What one cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Nothing drawn
    Idle,
    /// Draw reached the panel
    Drawn(DrawKind),
    /// Draw failed on every attempt and was skipped
    DrawSkipped,
    /// Restart requested from the watchdog
    Restart(FaultKind),
}

/// Board capabilities the runner drives
pub struct Board<C, S, D, W, B, L, Y> {
    pub clock: C,
    pub source: S,
    pub display: D,
    pub watchdog: W,
    pub buttons: B,
    pub led: L,
    pub delay: Y,
}

/// Cycle runner binding the core state to a board
pub struct Runner<C, S, D, W, B, L, Y> {
    core: CoreState,
    board: Board<C, S, D, W, B, L, Y>,
    /// Refresh button level at the previous sample
    button_was_pressed: bool,
}

impl<C, S, D, W, B, L, Y> Runner<C, S, D, W, B, L, Y>
where
    C: Clock,
    S: DepartureSource,
    D: DisplayDriver,
    W: Watchdog,
    B: Buttons,
    L: StatusLed,
    Y: DelayNs,
{
    pub fn new(core: CoreState, board: Board<C, S, D, W, B, L, Y>) -> Self {
        Self {
            core,
            board,
            button_was_pressed: false,
        }
    }

    pub fn core(&self) -> &CoreState {
        &self.core
    }

    pub fn board(&self) -> &Board<C, S, D, W, B, L, Y> {
        &self.board
    }

    /// Run cycles until a restart is requested
    ///
    /// On hardware the restart does not return, so neither does this.
    pub fn run(&mut self) -> FaultKind {
        loop {
            if let CycleOutcome::Restart(fault) = self.run_cycle() {
                return fault;
            }
        }
    }

    /// Run one cycle: input, fetch, draw, supervision, sleep
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.board.watchdog.feed();

        let pressed = self.board.buttons.refresh_pressed();
        if pressed && !self.button_was_pressed {
            self.core.on_manual_refresh();
        }
        self.button_was_pressed = pressed;

        let now = self.board.clock.now();
        if self.core.fetch_due(now) {
            self.board.watchdog.feed();
            let result = self.board.source.fetch();
            self.board.watchdog.feed();
            let connectivity = self.board.source.connectivity();
            let now = self.board.clock.now();
            self.core.on_fetch(now, result, connectivity);
        }

        let now = self.board.clock.now();
        let outcome = match self.core.poll_once(now) {
            RenderCommand::NoOp => CycleOutcome::Idle,
            RenderCommand::Draw {
                kind,
                commit,
                writes,
            } => match self.draw(&writes, commit) {
                Ok(()) => {
                    self.core.draw_completed();
                    CycleOutcome::Drawn(kind)
                }
                Err(_) => {
                    self.core.draw_failed();
                    CycleOutcome::DrawSkipped
                }
            },
        };

        let now = self.board.clock.now();
        self.board.led.set(self.core.status_led(now));

        if let HealthStatus::Fault(fault) = self.core.health(now) {
            error!("health: {:?}, restarting", fault);
            self.board.watchdog.feed();
            self.board.watchdog.restart();
            return CycleOutcome::Restart(fault);
        }

        if let Some(ms) = self.core.sleep_plan(now) {
            self.board.watchdog.feed();
            self.board.delay.delay_ms(ms);
            self.board.watchdog.feed();
        }

        outcome
    }

    /// Write and commit, retrying with exponential backoff
    fn draw(&mut self, writes: &[RegionWrite], commit: CommitKind) -> Result<(), HardwareError> {
        let mut backoff_ms = BACKOFF_BASE_MS;
        let mut attempt = 1;

        loop {
            self.board.watchdog.feed();
            let result = writes
                .iter()
                .try_for_each(|w| self.board.display.write_region(w))
                .and_then(|()| self.board.display.commit(commit));
            self.board.watchdog.feed();

            match result {
                Ok(()) => return Ok(()),
                Err(err) if attempt < DRAW_ATTEMPTS => {
                    warn!(
                        "draw: {} (attempt {}/{}), retrying in {} ms",
                        err, attempt, DRAW_ATTEMPTS, backoff_ms
                    );
                    self.board.delay.delay_ms(backoff_ms);
                    self.board.watchdog.feed();
                    backoff_ms = backoff_ms.saturating_mul(2);
                    attempt += 1;
                }
                Err(err) => {
                    warn!("draw: {} after {} attempts, skipping", err, DRAW_ATTEMPTS);
                    return Err(err);
                }
            }
        }
    }
}
