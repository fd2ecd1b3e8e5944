//! Departure data source trait

use crate::departures::{Connectivity, RawBatch};
use crate::error::FetchError;

/// Trait for fetching and decoding departures
///
/// Implementations own the network transport and JSON decoding; the
/// core only ever sees typed `RawDeparture` records.
pub trait DepartureSource {
    /// Fetch and decode the current departures
    ///
    /// Blocks for at most the implementation's request timeout.
    fn fetch(&mut self) -> Result<RawBatch, FetchError>;

    /// Current link quality for the status band
    fn connectivity(&self) -> Connectivity;
}
