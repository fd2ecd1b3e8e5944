//! Error taxonomy
//!
//! Network and data errors are recoverable: the previous display model is
//! kept and freshness degrades. Hardware errors are retried a bounded number
//! of times before the draw is skipped. Configuration errors are fatal at
//! start-up.

use core::fmt;

/// Failure to obtain a response from the departure service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// No network link (Wi-Fi down, no route)
    Disconnected,
    /// Request did not complete in time
    Timeout,
    /// Server answered with a non-success status
    Status(u16),
    /// Transport-level failure (DNS, TLS, connection reset)
    Transport,
}

/// Payload was received but cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataError {
    /// Body is not valid JSON or has the wrong top-level shape
    Malformed,
    /// The departures collection is missing entirely
    MissingDepartures,
}

/// Display controller did not accept a write or refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// Controller busy line did not release
    Busy,
    /// Transfer or refresh timed out
    Timeout,
}

/// Error returned by a departure source: fetch plus decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    Network(NetworkError),
    Data(DataError),
}

impl From<NetworkError> for FetchError {
    fn from(err: NetworkError) -> Self {
        FetchError::Network(err)
    }
}

impl From<DataError> for FetchError {
    fn from(err: DataError) -> Self {
        FetchError::Data(err)
    }
}

/// Configuration field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigField {
    Stops,
    LinePriority,
    UpdateInterval,
    AnimationInterval,
    FullRefreshInterval,
    StaleThreshold,
    StaleRestartThreshold,
    WatchdogTimeout,
    Rows,
    Columns,
    UtcOffset,
    DestinationShortnames,
}

impl ConfigField {
    /// Key name as written in the configuration file
    pub fn key(&self) -> &'static str {
        match self {
            ConfigField::Stops => "stops",
            ConfigField::LinePriority => "line_priority",
            ConfigField::UpdateInterval => "update_interval_sec",
            ConfigField::AnimationInterval => "animation_interval_sec",
            ConfigField::FullRefreshInterval => "full_refresh_interval_cycles",
            ConfigField::StaleThreshold => "stale_threshold_sec",
            ConfigField::StaleRestartThreshold => "stale_restart_threshold_sec",
            ConfigField::WatchdogTimeout => "watchdog_timeout_ms",
            ConfigField::Rows => "rows",
            ConfigField::Columns => "columns",
            ConfigField::UtcOffset => "utc_offset_min",
            ConfigField::DestinationShortnames => "destination_shortnames",
        }
    }
}

/// Configuration rejected at start-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Required field absent
    Missing(ConfigField),
    /// Field present but out of range or empty
    Invalid(ConfigField),
    /// More entries than the fixed capacity allows
    TooMany(ConfigField),
    /// Same stop identifier configured twice
    DuplicateStop,
    /// rows × columns does not fit the physical body rows
    BudgetExceedsDisplay,
    /// Watchdog too short to cover a fetch or a poll interval
    WatchdogTooShort,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(field) => write!(f, "missing required field `{}`", field.key()),
            ConfigError::Invalid(field) => write!(f, "invalid value for `{}`", field.key()),
            ConfigError::TooMany(field) => write!(f, "too many entries in `{}`", field.key()),
            ConfigError::DuplicateStop => write!(f, "stop configured more than once"),
            ConfigError::BudgetExceedsDisplay => {
                write!(f, "rows × columns exceeds the display body rows")
            }
            ConfigError::WatchdogTooShort => {
                write!(f, "watchdog timeout too short for the poll cadence")
            }
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(NetworkError::Disconnected) => write!(f, "network disconnected"),
            FetchError::Network(NetworkError::Timeout) => write!(f, "request timed out"),
            FetchError::Network(NetworkError::Status(code)) => write!(f, "HTTP status {}", code),
            FetchError::Network(NetworkError::Transport) => write!(f, "transport error"),
            FetchError::Data(DataError::Malformed) => write!(f, "malformed payload"),
            FetchError::Data(DataError::MissingDepartures) => {
                write!(f, "payload has no departures collection")
            }
        }
    }
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareError::Busy => write!(f, "display busy"),
            HardwareError::Timeout => write!(f, "display timeout"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_field() {
        let msg = ConfigError::Missing(ConfigField::Stops).to_string();
        assert!(msg.contains("stops"));
        let msg = ConfigError::Invalid(ConfigField::WatchdogTimeout).to_string();
        assert!(msg.contains("watchdog_timeout_ms"));
    }

    #[test]
    fn test_fetch_error_from() {
        assert_eq!(
            FetchError::from(NetworkError::Timeout),
            FetchError::Network(NetworkError::Timeout)
        );
        assert_eq!(
            FetchError::from(DataError::Malformed),
            FetchError::Data(DataError::Malformed)
        );
    }
}
