//! Configuration type definitions
//!
//! These types represent the board configuration. A `Config` only exists
//! once `ConfigBuilder::build` has validated it; afterwards it is read-only.

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum stop identifier length (DIVA numbers are 8 digits)
pub const MAX_STOP_ID_LEN: usize = 16;

/// Maximum line name length ("N49", "47A", "WLB")
pub const MAX_LINE_NAME_LEN: usize = 8;

/// Maximum direction code length ("H", "R")
pub const MAX_DIRECTION_LEN: usize = 4;

/// Maximum destination text length, in bytes
pub const MAX_DESTINATION_LEN: usize = 48;

/// Maximum abbreviated destination length, in bytes
pub const MAX_SHORTNAME_LEN: usize = 24;

/// Maximum configured stops
pub const MAX_STOPS: usize = 8;

/// Maximum lines per stop
pub const MAX_LINES_PER_STOP: usize = 8;

/// Maximum accepted direction codes per line
pub const MAX_DIRECTIONS: usize = 4;

/// Maximum line priority entries
pub const MAX_PRIORITY: usize = 16;

/// Maximum destination abbreviations
pub const MAX_SHORTNAMES: usize = 16;

/// Maximum line groups on screen (row budget ceiling)
pub const MAX_ROWS: usize = 8;

/// Maximum destinations per group (column budget ceiling)
pub const MAX_COLUMNS: usize = 6;

pub type StopId = String<MAX_STOP_ID_LEN>;
pub type LineName = String<MAX_LINE_NAME_LEN>;
pub type DirectionCode = String<MAX_DIRECTION_LEN>;
pub type Destination = String<MAX_DESTINATION_LEN>;

/// Accepted line at a stop
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineFilter {
    /// Line name as published by the operator
    pub name: LineName,
    /// Accepted direction codes; empty accepts all
    pub directions: Vec<DirectionCode, MAX_DIRECTIONS>,
    /// Walking time to the platform; earlier departures are hidden
    pub min_countdown: u16,
}

impl LineFilter {
    /// Check whether a departure direction passes this filter
    pub fn accepts_direction(&self, direction: &str) -> bool {
        self.directions.is_empty() || self.directions.iter().any(|d| d.as_str() == direction)
    }
}

/// Lines accepted at one stop
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StopFilter {
    /// Stop identifier (DIVA)
    pub stop: StopId,
    /// Accepted lines
    pub lines: Vec<LineFilter, MAX_LINES_PER_STOP>,
}

impl StopFilter {
    /// Find the filter for a line at this stop
    pub fn line(&self, name: &str) -> Option<&LineFilter> {
        self.lines.iter().find(|l| l.name.as_str() == name)
    }
}

/// Destination abbreviation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shortname {
    pub from: Destination,
    pub to: String<MAX_SHORTNAME_LEN>,
}

/// Validated board configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Config {
    pub(crate) stops: Vec<StopFilter, MAX_STOPS>,
    pub(crate) line_priority: Vec<LineName, MAX_PRIORITY>,
    pub(crate) update_interval_s: u32,
    pub(crate) animation_interval_s: u32,
    pub(crate) full_refresh_interval: u16,
    pub(crate) stale_threshold_s: u32,
    pub(crate) stale_restart_threshold_s: u32,
    pub(crate) watchdog_timeout_ms: u32,
    pub(crate) rows: u8,
    pub(crate) columns: u8,
    pub(crate) utc_offset_min: i16,
    pub(crate) shortnames: Vec<Shortname, MAX_SHORTNAMES>,
}

impl Config {
    pub fn stops(&self) -> &[StopFilter] {
        &self.stops
    }

    pub fn line_priority(&self) -> &[LineName] {
        &self.line_priority
    }

    /// Seconds between data fetches
    pub fn update_interval_s(&self) -> u32 {
        self.update_interval_s
    }

    /// Seconds between blink phase toggles
    pub fn animation_interval_s(&self) -> u32 {
        self.animation_interval_s
    }

    /// Data redraws between full refreshes
    pub fn full_refresh_interval(&self) -> u16 {
        self.full_refresh_interval
    }

    pub fn stale_threshold_s(&self) -> u32 {
        self.stale_threshold_s
    }

    /// Continuous staleness after which the board restarts
    pub fn stale_restart_threshold_s(&self) -> u32 {
        self.stale_restart_threshold_s
    }

    pub fn watchdog_timeout_ms(&self) -> u32 {
        self.watchdog_timeout_ms
    }

    /// Row budget: line groups on screen
    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    /// Column budget: destinations per group
    pub fn columns(&self) -> usize {
        usize::from(self.columns)
    }

    pub fn utc_offset_min(&self) -> i16 {
        self.utc_offset_min
    }

    pub fn shortnames(&self) -> &[Shortname] {
        &self.shortnames
    }

    /// Look up the abbreviation for a destination
    pub fn shortname(&self, destination: &str) -> Option<&str> {
        self.shortnames
            .iter()
            .find(|s| s.from.as_str() == destination)
            .map(|s| s.to.as_str())
    }
}
