//! Refresh scheduling
//!
//! E-paper partial refreshes are fast but leave ghosting behind; full
//! refreshes clear it at the cost of a visible flash. The scheduler picks
//! one of the two for every data redraw and owns the counter between them.

pub mod scheduler;

pub use scheduler::*;
