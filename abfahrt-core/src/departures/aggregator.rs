//! Departure aggregation
//!
//! Filters raw departures against the configured stops, groups them by
//! line, orders groups by the priority list, and truncates to the row and
//! column budgets. Pure: no I/O, no state, no logging.

use core::cmp::Ordering;

use heapless::Vec;

use super::model::{Connectivity, DepartureEntry, DepartureGroup, DisplayModel};
use super::raw::{truncate_str, DepartureTime, RawDeparture, MAX_RAW_DEPARTURES};
use crate::config::{Config, LineFilter, MAX_ROWS};
use crate::error::DataError;
use crate::traits::{Now, WallTime};

/// What happened to the raw records during one aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AggregateStats {
    /// Records shown on screen
    pub shown: u16,
    /// Stop, line or direction not configured
    pub filtered: u16,
    /// Timestamp missing or unparseable
    pub malformed: u16,
    /// Sooner than the line's walking time
    pub unreachable: u16,
    /// Dropped by the row or column budget
    pub truncated: u16,
}

/// Aggregation output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated {
    pub model: DisplayModel,
    pub stats: AggregateStats,
}

/// Accepted record awaiting grouping
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Index into the raw slice
    index: usize,
    /// Position in the priority list, or past its end
    rank: usize,
    countdown: u16,
}

/// Departure aggregator over a validated configuration
pub struct DepartureAggregator<'a> {
    config: &'a Config,
    /// Offset for the "updated" time, the configured one unless overridden
    utc_offset_min: i16,
}

impl<'a> DepartureAggregator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            utc_offset_min: config.utc_offset_min(),
        }
    }

    /// Use the offset the service reported instead of the configured one
    pub fn with_utc_offset(mut self, utc_offset_min: Option<i16>) -> Self {
        if let Some(offset) = utc_offset_min {
            self.utc_offset_min = offset;
        }
        self
    }

    /// Build a display model from one fetch
    ///
    /// # Arguments
    /// - `raw`: Decoded departures, `None` if the payload had no collection
    /// - `connectivity`: Link quality at fetch time
    /// - `now`: Fetch completion time
    ///
    /// Individual bad records are skipped and counted; only a missing
    /// collection is an error.
    pub fn aggregate(
        &self,
        raw: Option<&[RawDeparture]>,
        connectivity: Connectivity,
        now: Now,
    ) -> Result<Aggregated, DataError> {
        let raw = raw.ok_or(DataError::MissingDepartures)?;
        let mut stats = AggregateStats::default();
        let mut candidates: Vec<Candidate, MAX_RAW_DEPARTURES> = Vec::new();

        for (index, departure) in raw.iter().enumerate() {
            let Some(filter) = self.line_filter(departure) else {
                stats.filtered += 1;
                continue;
            };

            let DepartureTime::Known(instant) = departure.time else {
                stats.malformed += 1;
                continue;
            };

            let countdown = countdown_minutes(instant, now.unix_s);
            if countdown < filter.min_countdown {
                stats.unreachable += 1;
                continue;
            }

            let candidate = Candidate {
                index,
                rank: self.rank(departure.line.as_str()),
                countdown,
            };
            if candidates.push(candidate).is_err() {
                stats.truncated += 1;
            }
        }

        candidates.sort_unstable_by(|a, b| self.compare(raw, a, b));

        let rows = self.config.rows();
        let columns = self.config.columns();
        let mut groups: Vec<DepartureGroup, MAX_ROWS> = Vec::new();

        for candidate in &candidates {
            let departure = &raw[candidate.index];
            let same_line = groups
                .last()
                .is_some_and(|g| g.line.as_str() == departure.line.as_str());

            if !same_line {
                if groups.len() >= rows {
                    stats.truncated += 1;
                    continue;
                }
                let group = DepartureGroup {
                    line: departure.line.clone(),
                    entries: Vec::new(),
                };
                if groups.push(group).is_err() {
                    stats.truncated += 1;
                    continue;
                }
            }

            let Some(group) = groups.last_mut() else {
                continue;
            };
            if group.entries.len() >= columns {
                stats.truncated += 1;
                continue;
            }
            let entry = DepartureEntry::new(
                truncate_str(self.display_destination(departure)),
                candidate.countdown,
            );
            if group.entries.push(entry).is_err() {
                stats.truncated += 1;
                continue;
            }
            stats.shown += 1;
        }

        let updated = WallTime::from_unix(now.unix_s, self.utc_offset_min);
        Ok(Aggregated {
            model: DisplayModel::new(groups, connectivity, updated),
            stats,
        })
    }

    /// Find the filter accepting this departure, if any
    fn line_filter(&self, departure: &RawDeparture) -> Option<&'a LineFilter> {
        self.config
            .stops()
            .iter()
            .filter(|s| s.stop == departure.stop)
            .find_map(|s| s.line(departure.line.as_str()))
            .filter(|l| l.accepts_direction(departure.direction.as_str()))
    }

    fn rank(&self, line: &str) -> usize {
        let priority = self.config.line_priority();
        priority
            .iter()
            .position(|p| p.as_str() == line)
            .unwrap_or(priority.len())
    }

    fn display_destination<'d>(&'d self, departure: &'d RawDeparture) -> &'d str {
        self.config
            .shortname(departure.destination.as_str())
            .unwrap_or(departure.destination.as_str())
    }

    /// Total order: priority rank, line name, countdown, destination, input order
    fn compare(&self, raw: &[RawDeparture], a: &Candidate, b: &Candidate) -> Ordering {
        let da = &raw[a.index];
        let db = &raw[b.index];
        a.rank
            .cmp(&b.rank)
            .then_with(|| da.line.as_str().cmp(db.line.as_str()))
            .then_with(|| a.countdown.cmp(&b.countdown))
            .then_with(|| self.display_destination(da).cmp(self.display_destination(db)))
            .then_with(|| a.index.cmp(&b.index))
    }
}

/// Whole minutes from `now_s` to `instant_s`, clamped at zero
pub fn countdown_minutes(instant_s: i64, now_s: i64) -> u16 {
    let seconds = instant_s.saturating_sub(now_s);
    if seconds <= 0 {
        return 0;
    }
    u16::try_from(seconds / 60).unwrap_or(u16::MAX)
}
