//! Time sources

/// Monotonic and wall-clock time sampled together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Now {
    /// Milliseconds since boot, never goes backwards
    pub monotonic_ms: u64,
    /// Seconds since the Unix epoch (UTC), synchronized externally
    pub unix_s: i64,
}

impl Now {
    pub const fn new(monotonic_ms: u64, unix_s: i64) -> Self {
        Self {
            monotonic_ms,
            unix_s,
        }
    }
}

/// Clock capability
pub trait Clock {
    /// Sample the current time
    fn now(&mut self) -> Now;
}

/// Local time of day, minute resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
}

impl WallTime {
    const SECONDS_PER_DAY: i64 = 86_400;

    /// Convert a UTC instant to local time of day
    ///
    /// # Arguments
    /// - `unix_s`: Seconds since the Unix epoch
    /// - `utc_offset_min`: Local offset from UTC in minutes
    pub fn from_unix(unix_s: i64, utc_offset_min: i16) -> Self {
        let local = unix_s.saturating_add(i64::from(utc_offset_min) * 60);
        let of_day = local.rem_euclid(Self::SECONDS_PER_DAY);
        Self {
            hour: (of_day / 3600) as u8,
            minute: ((of_day % 3600) / 60) as u8,
        }
    }
}
