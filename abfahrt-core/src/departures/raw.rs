//! Raw departure records

use heapless::{String, Vec};

use crate::config::{Destination, DirectionCode, LineName, StopId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum departures kept from one fetch
pub const MAX_RAW_DEPARTURES: usize = 96;

/// Departure instant as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DepartureTime {
    /// Seconds since the Unix epoch; realtime if available, else scheduled
    Known(i64),
    /// Timestamp missing or unparseable
    Unknown,
}

/// One departure, exactly as decoded
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawDeparture {
    pub stop: StopId,
    pub line: LineName,
    pub direction: DirectionCode,
    pub destination: Destination,
    pub time: DepartureTime,
    /// Time is a live prediction rather than the timetable
    pub realtime: bool,
}

impl RawDeparture {
    /// Build a record, cutting overlong text at a character boundary
    pub fn new(
        stop: &str,
        line: &str,
        direction: &str,
        destination: &str,
        time: DepartureTime,
        realtime: bool,
    ) -> Self {
        Self {
            stop: truncate_str(stop),
            line: truncate_str(line),
            direction: truncate_str(direction),
            destination: truncate_str(destination),
            time,
            realtime,
        }
    }
}

/// Decoded result of one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    /// `None` when the payload had no departures collection at all
    departures: Option<Vec<RawDeparture, MAX_RAW_DEPARTURES>>,
    /// Records that did not fit
    dropped: u16,
    /// Payload entries the decoder could not read
    skipped: u16,
    /// Local UTC offset the service reported, in minutes
    utc_offset_min: Option<i16>,
}

impl Default for RawBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl RawBatch {
    /// Empty but well-formed batch
    pub fn new() -> Self {
        Self {
            departures: Some(Vec::new()),
            dropped: 0,
            skipped: 0,
            utc_offset_min: None,
        }
    }

    /// Batch whose payload lacked the departures collection
    pub fn missing() -> Self {
        Self {
            departures: None,
            dropped: 0,
            skipped: 0,
            utc_offset_min: None,
        }
    }

    /// Append a record; counted as dropped once full
    pub fn push(&mut self, departure: RawDeparture) {
        let departures = self.departures.get_or_insert_with(Vec::new);
        if departures.push(departure).is_err() {
            self.dropped = self.dropped.saturating_add(1);
        }
    }

    /// Count payload entries that were unreadable and left out
    pub fn record_skipped(&mut self, count: u16) {
        self.skipped = self.skipped.saturating_add(count);
    }

    /// Record the local UTC offset the service reported
    pub fn set_utc_offset(&mut self, minutes: i16) {
        self.utc_offset_min = Some(minutes);
    }

    pub fn utc_offset_min(&self) -> Option<i16> {
        self.utc_offset_min
    }

    pub fn departures(&self) -> Option<&[RawDeparture]> {
        self.departures.as_deref()
    }

    pub fn dropped(&self) -> u16 {
        self.dropped
    }

    pub fn skipped(&self) -> u16 {
        self.skipped
    }
}

/// Copy `s` into a bounded string, cutting at a character boundary
pub fn truncate_str<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
