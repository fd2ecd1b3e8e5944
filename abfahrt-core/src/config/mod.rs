//! Configuration types
//!
//! Board-agnostic configuration structures and their validation.

pub mod builder;
pub mod types;

pub use builder::*;
pub use types::*;
