//! Wiener Linien monitor API
//!
//! This crate turns the JSON returned by the departure proxy into the
//! `RawDeparture` records the core aggregates, and builds the stop filter
//! the proxy expects as its `filter` query parameter.
//!
//! # Payload Overview
//!
//! ```text
//! { "data": [                               one entry per stop
//!     { "diva": "60201438",
//!       "lines": [
//!         { "name": "49", "direction": "H", "towards": "Ring",
//!           "departures": [
//!             { "countdown": 3,
//!               "timePlanned": "2024-01-01T13:37:00.000+0100",
//!               "timeReal":    "2024-01-01T13:38:12.000+0100" } ] } ] } ] }
//! ```
//!
//! Timestamps are ISO 8601 with a numeric UTC offset. The realtime value
//! is preferred; the planned one is the fallback. The offset of the newest
//! timestamp tells the board the current local offset.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod decode;
pub mod filter;
pub mod payload;
pub mod time;

pub use decode::{decode, flatten};
pub use filter::filter_json;
pub use payload::{DeparturePayload, LinePayload, MonitorResponse, StopPayload};
pub use time::{parse_stamp, Stamp};
