//! Monitor API payload model
//!
//! Every field the board does not strictly need is optional so that a
//! partially filled response still yields the departures it does carry.
//! Collections are read entry by entry: an entry of the wrong shape is
//! counted and skipped, its siblings are kept.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Deref;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Collection that skips entries it cannot decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<T> {
    items: Vec<T>,
    skipped: u16,
}

impl<T> Entries<T> {
    /// Entries skipped at this level
    pub fn skipped(&self) -> u16 {
        self.skipped
    }
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: 0,
        }
    }
}

impl<T> Deref for Entries<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // The collection itself must still be a list
        let values = Vec::<Value>::deserialize(deserializer)?;
        let mut entries = Entries {
            items: Vec::with_capacity(values.len()),
            skipped: 0,
        };
        for value in values {
            match serde_json::from_value(value) {
                Ok(item) => entries.items.push(item),
                Err(err) => {
                    debug!("payload: skipping entry: {}", err);
                    entries.skipped = entries.skipped.saturating_add(1);
                }
            }
        }
        Ok(entries)
    }
}

/// Top-level response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorResponse {
    /// Stops; absent when the proxy reports an error
    #[serde(default)]
    pub data: Option<Entries<StopPayload>>,
}

/// One monitored stop
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StopPayload {
    /// Stop identifier (DIVA number)
    #[serde(default)]
    pub diva: Option<String>,
    #[serde(default)]
    pub lines: Entries<LinePayload>,
}

/// One line at a stop
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinePayload {
    pub name: String,
    /// Direction code ("H" outbound, "R" return)
    #[serde(default)]
    pub direction: Option<String>,
    /// Destination shown on the vehicle
    #[serde(default)]
    pub towards: Option<String>,
    #[serde(default)]
    pub departures: Entries<DeparturePayload>,
}

/// One departure of a line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeparturePayload {
    /// Minutes as computed by the server; informational only
    #[serde(default)]
    pub countdown: Option<i64>,
    #[serde(default)]
    pub time_planned: Option<String>,
    #[serde(default)]
    pub time_real: Option<String>,
    /// Per-departure destination, overrides the line's
    #[serde(default)]
    pub towards: Option<String>,
}
