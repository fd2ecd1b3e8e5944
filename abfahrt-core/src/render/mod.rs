//! Screen rendering
//!
//! Turns the display model into region writes for the display driver.
//! Layout is fixed; the driver decides how each primitive looks.

pub mod layout;
pub mod screen;

pub use layout::{Align, DrawOp, Font, Rect, RegionWrite, RegionWrites, HEIGHT, WIDTH};
pub use screen::{render, DrawKind};
