//! Timestamp parsing

use chrono::{DateTime, FixedOffset};

/// Offset style used by the monitor API ("+0100")
const MONITOR_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Instant plus the UTC offset it was reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    /// Seconds since the Unix epoch
    pub unix_s: i64,
    /// Local offset from UTC in minutes
    pub utc_offset_min: i16,
}

fn parse(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, MONITOR_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .ok()
}

/// Parse an API timestamp, keeping its UTC offset
///
/// Accepts the API's own format and RFC 3339 ("+01:00"). Returns `None`
/// for anything else; callers treat that as an unknown departure time.
/// The API reports Vienna local time, so the offset follows daylight
/// saving time.
pub fn parse_stamp(s: &str) -> Option<Stamp> {
    let t = parse(s)?;
    let offset_s = t.offset().local_minus_utc();
    Some(Stamp {
        unix_s: t.timestamp(),
        utc_offset_min: i16::try_from(offset_s / 60).ok()?,
    })
}
