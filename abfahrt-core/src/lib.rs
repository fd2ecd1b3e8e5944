//! Board-agnostic core logic for the departure board firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware or network implementations:
//!
//! - Capability traits (clock, departure source, display, watchdog, input)
//! - Departure aggregation into a bounded display model
//! - Data freshness tracking and stale-data supervision
//! - Refresh scheduling (partial vs. full e-paper redraws)
//! - Blink animation phase
//! - Pure screen layout
//! - The cooperative cycle runner
//! - Configuration type definitions and validation

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod animation;
pub mod config;
pub mod departures;
pub mod engine;
pub mod error;
pub mod freshness;
pub mod health;
pub mod refresh;
pub mod render;
pub mod runner;
pub mod traits;

pub use engine::{CoreState, RenderCommand};
pub use error::{ConfigError, DataError, FetchError, HardwareError, NetworkError};
