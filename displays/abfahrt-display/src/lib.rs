//! Pixel output for the departure board
//!
//! This crate provides:
//! - `FrameBuffer`, a 1-bit 400×300 buffer usable as an embedded-graphics `DrawTarget`
//! - `paint`, which rasterizes the core's `RegionWrite`s into the buffer
//! - `Panel` trait for the physical e-paper controller (or a host stand-in)
//! - `BufferedDisplay`, the `DisplayDriver` the core runner talks to
//!
//! # Architecture
//!
//! The core layout engine produces pure region writes and never touches
//! pixels. `BufferedDisplay` paints each write into its frame buffer and
//! tracks the dirty area. On commit it hands the buffer and the dirty
//! rectangle to a `Panel`, which pushes the bytes out and runs the
//! requested waveform.
//!
//! ## Buffer format
//!
//! Rows are packed MSB first, 50 bytes per row. A set bit is white and a
//! cleared bit is black, which is what SSD1683-class controllers expect in
//! their black/white RAM.

#![no_std]

pub mod backend;
pub mod buffered;
pub mod framebuffer;
pub mod paint;

pub use backend::{Panel, PanelError};
pub use buffered::BufferedDisplay;
pub use framebuffer::{FrameBuffer, BUFFER_SIZE, ROW_BYTES};
pub use paint::paint;
