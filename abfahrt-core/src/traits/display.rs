//! Display driver trait for the e-paper panel

use crate::error::HardwareError;
use crate::render::RegionWrite;

/// How the panel should refresh after the buffered writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitKind {
    /// Fast partial waveform; accumulates ghosting
    Partial,
    /// Full waveform with flashing; clears ghosting
    Full,
}

/// Trait for panel output
///
/// The driver owns the pixel buffer. The core hands it region writes
/// produced by the layout engine, then asks for a refresh.
pub trait DisplayDriver {
    /// Rasterize one region write into the buffer
    fn write_region(&mut self, write: &RegionWrite) -> Result<(), HardwareError>;

    /// Push the buffer to the panel and run a refresh waveform
    fn commit(&mut self, kind: CommitKind) -> Result<(), HardwareError>;
}
