//! Health monitor implementation
//!
//! Watches how long the board has gone without fresh data and requests a
//! hard reset once fetches keep failing past the restart threshold.

/// Fault conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// No successful fetch for longer than the restart threshold
    StaleData { age_s: u32 },
}

/// Health condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HealthStatus {
    /// All conditions normal
    Ok,
    /// Restart required
    Fault(FaultKind),
}

/// Health monitor for restart decisions
#[derive(Debug, Clone)]
pub struct HealthMonitor {
    /// Continuous staleness that triggers a restart (s)
    restart_threshold_s: u32,
    /// Monotonic boot time (ms)
    boot_ms: u64,
    /// Fetches failed in a row
    failed_fetches: u16,
    /// Draws abandoned in a row
    failed_draws: u16,
}

impl HealthMonitor {
    pub fn new(restart_threshold_s: u32, boot_ms: u64) -> Self {
        Self {
            restart_threshold_s,
            boot_ms,
            failed_fetches: 0,
            failed_draws: 0,
        }
    }

    pub fn fetch_succeeded(&mut self) {
        self.failed_fetches = 0;
    }

    pub fn fetch_failed(&mut self) {
        self.failed_fetches = self.failed_fetches.saturating_add(1);
    }

    pub fn draw_succeeded(&mut self) {
        self.failed_draws = 0;
    }

    pub fn draw_abandoned(&mut self) {
        self.failed_draws = self.failed_draws.saturating_add(1);
    }

    pub fn failed_fetches(&self) -> u16 {
        self.failed_fetches
    }

    pub fn failed_draws(&self) -> u16 {
        self.failed_draws
    }

    /// Check restart conditions
    ///
    /// # Arguments
    /// - `now_ms`: Current monotonic time
    /// - `data_age_s`: Seconds since the last successful fetch, `None` if
    ///   there has been none since boot (age then counts from boot)
    pub fn check(&self, now_ms: u64, data_age_s: Option<u32>) -> HealthStatus {
        let age_s = data_age_s.unwrap_or_else(|| {
            u32::try_from(now_ms.saturating_sub(self.boot_ms) / 1000).unwrap_or(u32::MAX)
        });

        if self.failed_fetches > 0 && age_s > self.restart_threshold_s {
            return HealthStatus::Fault(FaultKind::StaleData { age_s });
        }

        HealthStatus::Ok
    }
}
