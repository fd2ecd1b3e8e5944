//! Departure data
//!
//! Raw records as delivered by the departure source, the bounded display
//! model, and the aggregator that turns one into the other.

pub mod aggregator;
pub mod model;
pub mod raw;

pub use aggregator::{AggregateStats, Aggregated, DepartureAggregator};
pub use model::{Connectivity, DepartureEntry, DepartureGroup, DisplayModel, Freshness};
pub use raw::{truncate_str, DepartureTime, RawBatch, RawDeparture, MAX_RAW_DEPARTURES};
