//! Data freshness tracking
//!
//! Freshness is advisory: it changes what the status band says, never
//! whether the render path runs.

use crate::departures::Freshness;

/// Tracks the last successful fetch
#[derive(Debug, Clone)]
pub struct FreshnessTracker {
    /// Monotonic time of the last success (ms)
    last_success_ms: Option<u64>,
    /// Age beyond which data counts as stale (s)
    stale_threshold_s: u32,
}

impl FreshnessTracker {
    pub fn new(stale_threshold_s: u32) -> Self {
        Self {
            last_success_ms: None,
            stale_threshold_s,
        }
    }

    /// Record a successful fetch and aggregation
    pub fn record_success(&mut self, now_ms: u64) {
        self.last_success_ms = Some(now_ms);
    }

    /// Seconds since the last success, `None` before the first one
    pub fn age_s(&self, now_ms: u64) -> Option<u32> {
        self.last_success_ms.map(|last| {
            let age_ms = now_ms.saturating_sub(last);
            u32::try_from(age_ms / 1000).unwrap_or(u32::MAX)
        })
    }

    /// Derive the freshness state at `now_ms`
    pub fn snapshot(&self, now_ms: u64) -> Freshness {
        match self.age_s(now_ms) {
            None => Freshness::Error,
            Some(age_s) if age_s > self.stale_threshold_s => Freshness::Stale { age_s },
            Some(_) => Freshness::Fresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_before_first_success() {
        let tracker = FreshnessTracker::new(60);
        assert_eq!(tracker.snapshot(0), Freshness::Error);
        assert_eq!(tracker.snapshot(1_000_000), Freshness::Error);
    }

    #[test]
    fn test_stale_threshold_boundary() {
        let mut tracker = FreshnessTracker::new(60);
        tracker.record_success(10_000);

        assert_eq!(tracker.snapshot(10_000 + 59_000), Freshness::Fresh);
        assert_eq!(tracker.snapshot(10_000 + 60_000), Freshness::Fresh);
        assert_eq!(
            tracker.snapshot(10_000 + 61_000),
            Freshness::Stale { age_s: 61 }
        );
    }

    #[test]
    fn test_success_resets_age() {
        let mut tracker = FreshnessTracker::new(60);
        tracker.record_success(0);
        assert!(matches!(tracker.snapshot(120_000), Freshness::Stale { .. }));
        tracker.record_success(120_000);
        assert_eq!(tracker.snapshot(121_000), Freshness::Fresh);
    }

    #[test]
    fn test_clock_behind_success_is_fresh() {
        let mut tracker = FreshnessTracker::new(60);
        tracker.record_success(5_000);
        assert_eq!(tracker.age_s(1_000), Some(0));
        assert_eq!(tracker.snapshot(1_000), Freshness::Fresh);
    }
}
