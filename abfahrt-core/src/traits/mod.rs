//! Capability traits
//!
//! Everything the core needs from the outside world is expressed here:
//! time, departure data, the panel, the watchdog, and the front buttons.
//! Board crates implement these; the core never touches hardware directly.

pub mod clock;
pub mod display;
pub mod input;
pub mod source;
pub mod watchdog;

pub use clock::{Clock, Now, WallTime};
pub use display::{CommitKind, DisplayDriver};
pub use input::{Buttons, StatusLed};
pub use source::DepartureSource;
pub use watchdog::Watchdog;
