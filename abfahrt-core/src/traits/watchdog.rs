//! Hardware watchdog trait

/// Watchdog capability
///
/// `feed` must be called at least once per `watchdog_timeout_ms`,
/// otherwise the board resets.
pub trait Watchdog {
    /// Re-arm the watchdog
    fn feed(&mut self);

    /// Request an immediate hard reset
    ///
    /// On hardware this does not return. Test doubles record the request.
    fn restart(&mut self);
}
