//! Front panel input and indicator

/// Front panel buttons
pub trait Buttons {
    /// Sample the refresh button; true while pressed
    fn refresh_pressed(&mut self) -> bool;
}

/// Single status LED
pub trait StatusLed {
    fn set(&mut self, on: bool);
}
