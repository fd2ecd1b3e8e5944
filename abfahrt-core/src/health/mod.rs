//! Health supervision
//!
//! Decides when the board should give up and restart.

pub mod monitor;

pub use monitor::*;
