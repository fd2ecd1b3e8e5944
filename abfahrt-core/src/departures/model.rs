//! Bounded display model

use heapless::Vec;

use crate::config::{Destination, LineName, MAX_COLUMNS, MAX_ROWS};
use crate::traits::WallTime;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One destination row under a line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepartureEntry {
    /// Destination text, abbreviated if configured
    pub destination: Destination,
    /// Whole minutes until departure, never negative
    pub countdown_min: u16,
    /// Departing now (countdown is zero)
    pub due: bool,
}

impl DepartureEntry {
    pub fn new(destination: Destination, countdown_min: u16) -> Self {
        Self {
            destination,
            countdown_min,
            due: countdown_min == 0,
        }
    }
}

/// All shown departures of one line, soonest first
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DepartureGroup {
    pub line: LineName,
    pub entries: Vec<DepartureEntry, MAX_COLUMNS>,
}

/// Data freshness derived from the last successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Freshness {
    /// Last success within the stale threshold
    Fresh,
    /// Last success longer ago than the stale threshold
    Stale { age_s: u32 },
    /// No successful fetch since boot
    Error,
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

/// Network link quality shown in the status band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Connectivity {
    /// No link
    Disconnected,
    /// Signal bars, 0..=4
    Level(u8),
}

impl Connectivity {
    /// Highest signal level
    pub const MAX_LEVEL: u8 = 4;

    /// Signal bars, clamped; `None` when disconnected
    pub fn bars(&self) -> Option<u8> {
        match self {
            Connectivity::Disconnected => None,
            Connectivity::Level(level) => Some((*level).min(Self::MAX_LEVEL)),
        }
    }
}

/// Everything the screen shows, bounded by the row and column budgets
///
/// A model is never edited after construction. Status changes produce a
/// new model via `with_status`, leaving the departure groups untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    groups: Vec<DepartureGroup, MAX_ROWS>,
    freshness: Freshness,
    connectivity: Connectivity,
    updated: Option<WallTime>,
}

impl Default for DisplayModel {
    fn default() -> Self {
        Self::empty()
    }
}

impl DisplayModel {
    /// Model before any data has been fetched
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            freshness: Freshness::Error,
            connectivity: Connectivity::Disconnected,
            updated: None,
        }
    }

    pub(crate) fn new(
        groups: Vec<DepartureGroup, MAX_ROWS>,
        connectivity: Connectivity,
        updated: WallTime,
    ) -> Self {
        Self {
            groups,
            freshness: Freshness::Fresh,
            connectivity,
            updated: Some(updated),
        }
    }

    /// Line groups in display order
    pub fn groups(&self) -> &[DepartureGroup] {
        &self.groups
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Local time of the fetch this model was built from
    pub fn updated(&self) -> Option<WallTime> {
        self.updated
    }

    /// Total destination rows across all groups
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// Copy of this model with re-derived status, groups unchanged
    pub fn with_status(&self, freshness: Freshness, connectivity: Connectivity) -> Self {
        Self {
            groups: self.groups.clone(),
            freshness,
            connectivity,
            updated: self.updated,
        }
    }
}
