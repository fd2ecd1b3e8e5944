//! Core state coordinating aggregation, freshness, animation, and refresh
//!
//! `CoreState` is the single owner of everything that persists between
//! cycles:
//! - Retains the last display model and replaces it wholesale
//! - Tracks data freshness and the blink phase
//! - Asks the refresh scheduler for one decision per cycle
//! - Produces the region writes for that decision
//!
//! It performs no I/O. The runner feeds it fetch results and reports back
//! whether each draw reached the panel.

use log::{debug, info, warn};

use crate::animation::{should_blink, AnimationState};
use crate::config::Config;
use crate::departures::{
    Aggregated, Connectivity, DepartureAggregator, DisplayModel, Freshness, RawBatch,
};
use crate::error::FetchError;
use crate::freshness::FreshnessTracker;
use crate::health::{HealthMonitor, HealthStatus};
use crate::refresh::{DrawDecision, RefreshInputs, RefreshScheduler, SchedulerState};
use crate::render::{render, DrawKind, RegionWrites};
use crate::traits::{CommitKind, Now};

/// Loop cadence; bounds button latency
pub const POLL_INTERVAL_MS: u32 = 1_000;

/// Headroom kept between the longest sleep and the watchdog timeout
pub const WATCHDOG_MARGIN_MS: u32 = 500;

/// Output of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    /// Nothing to draw this cycle
    NoOp,
    /// Write these regions, then commit with the given waveform
    Draw {
        kind: DrawKind,
        commit: CommitKind,
        writes: RegionWrites,
    },
}

/// Create the core state from a validated configuration
pub fn initialize(config: Config, now: Now) -> CoreState {
    CoreState::new(config, now)
}

/// Persistent core state
pub struct CoreState {
    config: Config,
    /// Last model; replaced, never edited
    model: DisplayModel,
    freshness: FreshnessTracker,
    animation: AnimationState,
    scheduler: RefreshScheduler,
    health: HealthMonitor,
    /// Monotonic time the next fetch is due (ms)
    next_fetch_ms: u64,
    /// Model changed since the last completed data draw
    data_pending: bool,
    /// Blink phase changed since the last completed draw
    phase_pending: bool,
    /// Kind of the draw handed out and not yet reported back
    in_flight: Option<DrawKind>,
}

impl CoreState {
    /// Create the core state; the first fetch is due immediately
    pub fn new(config: Config, now: Now) -> Self {
        info!(
            "core: {} stops, fetch every {}s, full refresh every {} draws",
            config.stops().len(),
            config.update_interval_s(),
            config.full_refresh_interval()
        );

        Self {
            model: DisplayModel::empty(),
            freshness: FreshnessTracker::new(config.stale_threshold_s()),
            animation: AnimationState::new(config.animation_interval_s(), now.monotonic_ms),
            scheduler: RefreshScheduler::new(config.full_refresh_interval()),
            health: HealthMonitor::new(config.stale_restart_threshold_s(), now.monotonic_ms),
            next_fetch_ms: now.monotonic_ms,
            data_pending: false,
            phase_pending: false,
            in_flight: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Currently retained display model
    pub fn model(&self) -> &DisplayModel {
        &self.model
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn refresh_scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Freshness derived at `now`
    pub fn freshness(&self, now: Now) -> Freshness {
        self.freshness.snapshot(now.monotonic_ms)
    }

    /// Check if a fetch should run this cycle
    pub fn fetch_due(&self, now: Now) -> bool {
        now.monotonic_ms >= self.next_fetch_ms
    }

    /// Handle the refresh button: fetch now and redraw in full
    pub fn on_manual_refresh(&mut self) {
        info!("core: manual refresh requested");
        self.scheduler.request_full();
        self.next_fetch_ms = 0;
    }

    /// Absorb the result of a fetch attempt
    ///
    /// On success the aggregated model replaces the retained one. On any
    /// failure the retained groups stay and only the status is re-derived.
    pub fn on_fetch(
        &mut self,
        now: Now,
        result: Result<RawBatch, FetchError>,
        connectivity: Connectivity,
    ) {
        self.next_fetch_ms = now
            .monotonic_ms
            .saturating_add(u64::from(self.config.update_interval_s()) * 1000);

        let aggregated = result.and_then(|batch| {
            if batch.dropped() > 0 {
                warn!("fetch: {} departures over capacity dropped", batch.dropped());
            }
            let mut aggregated = DepartureAggregator::new(&self.config)
                .with_utc_offset(batch.utc_offset_min())
                .aggregate(batch.departures(), connectivity, now)
                .map_err(FetchError::Data)?;
            aggregated.stats.malformed =
                aggregated.stats.malformed.saturating_add(batch.skipped());
            Ok(aggregated)
        });

        let next = match aggregated {
            Ok(Aggregated { model, stats }) => {
                self.freshness.record_success(now.monotonic_ms);
                self.health.fetch_succeeded();
                info!(
                    "fetch: {} departures on {} lines",
                    stats.shown,
                    model.groups().len()
                );
                debug!(
                    "fetch: filtered {} malformed {} unreachable {} truncated {}",
                    stats.filtered, stats.malformed, stats.unreachable, stats.truncated
                );
                model
            }
            Err(err) => {
                self.health.fetch_failed();
                let freshness = self.freshness.snapshot(now.monotonic_ms);
                warn!(
                    "fetch: {} ({} in a row), keeping previous data ({:?})",
                    err,
                    self.health.failed_fetches(),
                    freshness
                );
                self.model.with_status(freshness, connectivity)
            }
        };

        if next != self.model {
            self.model = next;
            self.data_pending = true;
        }
    }

    /// Run one scheduling cycle
    pub fn poll_once(&mut self, now: Now) -> RenderCommand {
        if self.animation.tick(now.monotonic_ms) && self.has_blinking_rows() {
            self.phase_pending = true;
        }

        let inputs = RefreshInputs {
            data_ready: self.data_pending,
            animation_due: self.phase_pending,
        };
        let (kind, commit) = match self.scheduler.plan(inputs) {
            DrawDecision::DrawFull => (DrawKind::Full, CommitKind::Full),
            DrawDecision::DrawPartial => (DrawKind::Partial, CommitKind::Partial),
            DrawDecision::DrawAnimationRegion => (DrawKind::AnimationRegion, CommitKind::Partial),
            DrawDecision::NoOp => {
                self.in_flight = None;
                return RenderCommand::NoOp;
            }
        };

        self.in_flight = Some(kind);
        let writes = render(
            &self.model,
            self.model.freshness(),
            self.model.connectivity(),
            self.animation.phase(),
            kind,
        );
        RenderCommand::Draw {
            kind,
            commit,
            writes,
        }
    }

    /// The last draw reached the panel
    pub fn draw_completed(&mut self) {
        match self.in_flight.take() {
            Some(DrawKind::Full) | Some(DrawKind::Partial) => {
                self.data_pending = false;
                self.phase_pending = false;
            }
            Some(DrawKind::AnimationRegion) => self.phase_pending = false,
            None => {}
        }
        self.scheduler.complete();
        self.health.draw_succeeded();
    }

    /// The last draw was given up after retries
    pub fn draw_failed(&mut self) {
        self.health.draw_abandoned();
        if let Some(kind) = self.in_flight.take() {
            warn!(
                "draw: {:?} abandoned ({} in a row), retrying next cycle",
                kind,
                self.health.failed_draws()
            );
        }
        self.scheduler.abandon();
    }

    /// Check restart conditions
    pub fn health(&self, now: Now) -> HealthStatus {
        self.health
            .check(now.monotonic_ms, self.freshness.age_s(now.monotonic_ms))
    }

    /// Status LED: lit while data is not fresh
    pub fn status_led(&self, now: Now) -> bool {
        !self.freshness(now).is_fresh()
    }

    /// Milliseconds the loop may sleep, `None` if it must not
    ///
    /// Sleep ends before the next fetch, before the next blink toggle when
    /// blinking rows are on screen, and never outlasts the watchdog.
    pub fn sleep_plan(&self, now: Now) -> Option<u32> {
        if !self.scheduler.is_idle() {
            return None;
        }

        let mut wake_ms = self.next_fetch_ms;
        if self.has_blinking_rows() {
            wake_ms = wake_ms.min(self.animation.next_toggle_ms());
        }

        let cap = POLL_INTERVAL_MS.min(
            self.config
                .watchdog_timeout_ms()
                .saturating_sub(WATCHDOG_MARGIN_MS),
        );
        let until = wake_ms.saturating_sub(now.monotonic_ms);
        let ms = u32::try_from(until).unwrap_or(u32::MAX).min(cap);
        (ms > 0).then_some(ms)
    }

    fn has_blinking_rows(&self) -> bool {
        self.model.freshness() != Freshness::Error
            && self
                .model
                .groups()
                .iter()
                .flat_map(|g| g.entries.iter())
                .any(|e| should_blink(e.countdown_min, e.due))
    }
}
