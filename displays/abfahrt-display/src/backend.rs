//! Panel backend trait
//!
//! Defines the interface between the frame buffer and the physical
//! e-paper controller.

use abfahrt_core::error::HardwareError;
use abfahrt_core::render::Rect;
use abfahrt_core::traits::CommitKind;

/// Panel backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Communication error with the controller
    Communication,
    /// Busy line never released
    Busy,
    /// Refresh waveform did not finish in time
    Timeout,
    /// Controller not initialized
    NotInitialized,
}

impl From<PanelError> for HardwareError {
    fn from(err: PanelError) -> Self {
        match err {
            PanelError::Busy | PanelError::NotInitialized => HardwareError::Busy,
            PanelError::Communication | PanelError::Timeout => HardwareError::Timeout,
        }
    }
}

/// Panel backend trait
///
/// Implementations push packed rows (MSB first, set bit = white) to the
/// controller and run a refresh waveform. Bytes are laid out exactly as
/// in [`FrameBuffer`](crate::FrameBuffer).
pub trait Panel {
    /// Transfer `area` of `frame` and refresh with the given waveform
    ///
    /// A full refresh always covers the whole screen; `area` is only a
    /// hint for partial windows.
    fn refresh(&mut self, frame: &[u8], area: Rect, kind: CommitKind) -> Result<(), PanelError>;

    /// Check if the controller can accept a refresh
    fn is_ready(&self) -> bool;
}
