//! Configuration builder and validation
//!
//! Loaders fill a `ConfigBuilder` field by field; `build` checks every
//! field once and produces the immutable `Config`. Any failure is fatal
//! at start-up, there is no fallback configuration.

use heapless::{String, Vec};

use super::types::*;
use crate::engine::{POLL_INTERVAL_MS, WATCHDOG_MARGIN_MS};
use crate::error::{ConfigError, ConfigField};
use crate::render::layout::BODY_ROWS;

/// Default row budget when not configured
pub const DEFAULT_ROWS: u8 = 4;

/// Default column budget when not configured
pub const DEFAULT_COLUMNS: u8 = 3;

/// Default continuous-staleness restart threshold
pub const DEFAULT_STALE_RESTART_THRESHOLD_S: u32 = 600;

/// Largest accepted UTC offset magnitude (UTC+14)
const MAX_UTC_OFFSET_MIN: i16 = 14 * 60;

/// Copy a string into a bounded buffer, rejecting overlong input
fn bounded<const N: usize>(s: &str, field: ConfigField) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(s).map_err(|_| ConfigError::Invalid(field))?;
    Ok(out)
}

/// Unvalidated configuration
///
/// Scalar fields are plain options; list fields are filled through the
/// `add_*` methods, which enforce the fixed capacities.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    stops: Vec<StopFilter, MAX_STOPS>,
    /// `None` until the loader supplies the list, even an empty one
    line_priority: Option<Vec<LineName, MAX_PRIORITY>>,
    shortnames: Vec<Shortname, MAX_SHORTNAMES>,
    pub update_interval_s: Option<u32>,
    pub animation_interval_s: Option<u32>,
    pub full_refresh_interval: Option<u16>,
    pub stale_threshold_s: Option<u32>,
    pub stale_restart_threshold_s: Option<u32>,
    pub watchdog_timeout_ms: Option<u32>,
    pub rows: Option<u8>,
    pub columns: Option<u8>,
    pub utc_offset_min: Option<i16>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop; returns its index for `add_line`
    pub fn add_stop(&mut self, stop: &str) -> Result<usize, ConfigError> {
        if stop.is_empty() {
            return Err(ConfigError::Invalid(ConfigField::Stops));
        }
        if self.stops.iter().any(|s| s.stop.as_str() == stop) {
            return Err(ConfigError::DuplicateStop);
        }
        let filter = StopFilter {
            stop: bounded(stop, ConfigField::Stops)?,
            lines: Vec::new(),
        };
        self.stops
            .push(filter)
            .map_err(|_| ConfigError::TooMany(ConfigField::Stops))?;
        Ok(self.stops.len() - 1)
    }

    /// Add an accepted line to a stop
    ///
    /// # Arguments
    /// - `stop`: Index returned by `add_stop`
    /// - `name`: Line name
    /// - `directions`: Accepted direction codes; empty accepts all
    /// - `min_countdown`: Hide departures sooner than this many minutes
    pub fn add_line(
        &mut self,
        stop: usize,
        name: &str,
        directions: &[&str],
        min_countdown: u16,
    ) -> Result<(), ConfigError> {
        let filter = self
            .stops
            .get_mut(stop)
            .ok_or(ConfigError::Invalid(ConfigField::Stops))?;
        if name.is_empty() || filter.line(name).is_some() {
            return Err(ConfigError::Invalid(ConfigField::Stops));
        }

        let mut accepted = Vec::new();
        for direction in directions {
            accepted
                .push(bounded(direction, ConfigField::Stops)?)
                .map_err(|_| ConfigError::TooMany(ConfigField::Stops))?;
        }

        filter
            .lines
            .push(LineFilter {
                name: bounded(name, ConfigField::Stops)?,
                directions: accepted,
                min_countdown,
            })
            .map_err(|_| ConfigError::TooMany(ConfigField::Stops))
    }

    /// Set the priority list, most important line first
    ///
    /// The list is required; an empty one ranks every line equally.
    pub fn set_priority(&mut self, lines: &[&str]) -> Result<(), ConfigError> {
        let mut priority = Vec::new();
        for line in lines {
            let name = bounded(line, ConfigField::LinePriority)?;
            if priority.contains(&name) {
                return Err(ConfigError::Invalid(ConfigField::LinePriority));
            }
            priority
                .push(name)
                .map_err(|_| ConfigError::TooMany(ConfigField::LinePriority))?;
        }
        self.line_priority = Some(priority);
        Ok(())
    }

    /// Add a destination abbreviation
    pub fn add_shortname(&mut self, from: &str, to: &str) -> Result<(), ConfigError> {
        let entry = Shortname {
            from: bounded(from, ConfigField::DestinationShortnames)?,
            to: bounded(to, ConfigField::DestinationShortnames)?,
        };
        self.shortnames
            .push(entry)
            .map_err(|_| ConfigError::TooMany(ConfigField::DestinationShortnames))
    }

    /// Validate and freeze the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        use ConfigField::*;

        if self.stops.is_empty() {
            return Err(ConfigError::Missing(Stops));
        }
        if self.stops.iter().any(|s| s.lines.is_empty()) {
            return Err(ConfigError::Invalid(Stops));
        }

        let line_priority = self.line_priority.ok_or(ConfigError::Missing(LinePriority))?;
        let update_interval_s = positive(self.update_interval_s, UpdateInterval)?;
        let animation_interval_s = positive(self.animation_interval_s, AnimationInterval)?;
        let full_refresh_interval = self
            .full_refresh_interval
            .ok_or(ConfigError::Missing(FullRefreshInterval))?;
        if full_refresh_interval == 0 {
            return Err(ConfigError::Invalid(FullRefreshInterval));
        }
        let stale_threshold_s = positive(self.stale_threshold_s, StaleThreshold)?;
        let stale_restart_threshold_s = self
            .stale_restart_threshold_s
            .unwrap_or(DEFAULT_STALE_RESTART_THRESHOLD_S);
        if stale_restart_threshold_s <= stale_threshold_s {
            return Err(ConfigError::Invalid(StaleRestartThreshold));
        }

        let watchdog_timeout_ms = self
            .watchdog_timeout_ms
            .ok_or(ConfigError::Missing(WatchdogTimeout))?;
        if watchdog_timeout_ms < POLL_INTERVAL_MS + WATCHDOG_MARGIN_MS {
            return Err(ConfigError::WatchdogTooShort);
        }

        let rows = self.rows.unwrap_or(DEFAULT_ROWS);
        if rows == 0 || usize::from(rows) > MAX_ROWS {
            return Err(ConfigError::Invalid(Rows));
        }
        let columns = self.columns.unwrap_or(DEFAULT_COLUMNS);
        if columns == 0 || usize::from(columns) > MAX_COLUMNS {
            return Err(ConfigError::Invalid(Columns));
        }
        if usize::from(rows) * usize::from(columns) > BODY_ROWS {
            return Err(ConfigError::BudgetExceedsDisplay);
        }

        let utc_offset_min = self.utc_offset_min.unwrap_or(0);
        if utc_offset_min.abs() > MAX_UTC_OFFSET_MIN {
            return Err(ConfigError::Invalid(UtcOffset));
        }

        Ok(Config {
            stops: self.stops,
            line_priority,
            update_interval_s,
            animation_interval_s,
            full_refresh_interval,
            stale_threshold_s,
            stale_restart_threshold_s,
            watchdog_timeout_ms,
            rows,
            columns,
            utc_offset_min,
            shortnames: self.shortnames,
        })
    }
}

fn positive(value: Option<u32>, field: ConfigField) -> Result<u32, ConfigError> {
    match value {
        None => Err(ConfigError::Missing(field)),
        Some(0) => Err(ConfigError::Invalid(field)),
        Some(v) => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_builder() -> ConfigBuilder {
        let mut b = ConfigBuilder::new();
        let stop = b.add_stop("60201438").unwrap();
        b.add_line(stop, "49", &[], 0).unwrap();
        b.add_line(stop, "N49", &["R"], 0).unwrap();
        b.set_priority(&[]).unwrap();
        b.update_interval_s = Some(30);
        b.animation_interval_s = Some(1);
        b.full_refresh_interval = Some(40);
        b.stale_threshold_s = Some(60);
        b.watchdog_timeout_ms = Some(30_000);
        b
    }

    #[test]
    fn test_build_defaults() {
        let config = make_builder().build().unwrap();
        assert_eq!(config.rows(), usize::from(DEFAULT_ROWS));
        assert_eq!(config.columns(), usize::from(DEFAULT_COLUMNS));
        assert_eq!(
            config.stale_restart_threshold_s(),
            DEFAULT_STALE_RESTART_THRESHOLD_S
        );
        assert_eq!(config.utc_offset_min(), 0);
        assert_eq!(config.stops().len(), 1);
        assert!(config.line_priority().is_empty());
    }

    #[test]
    fn test_missing_stops() {
        let mut b = ConfigBuilder::new();
        b.update_interval_s = Some(30);
        assert_eq!(b.build(), Err(ConfigError::Missing(ConfigField::Stops)));
    }

    #[test]
    fn test_missing_required_scalars() {
        let mut b = make_builder();
        b.update_interval_s = None;
        assert_eq!(
            b.build(),
            Err(ConfigError::Missing(ConfigField::UpdateInterval))
        );

        let mut b = make_builder();
        b.watchdog_timeout_ms = None;
        assert_eq!(
            b.build(),
            Err(ConfigError::Missing(ConfigField::WatchdogTimeout))
        );

        let mut b = make_builder();
        b.full_refresh_interval = None;
        assert_eq!(
            b.build(),
            Err(ConfigError::Missing(ConfigField::FullRefreshInterval))
        );
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut b = make_builder();
        b.animation_interval_s = Some(0);
        assert_eq!(
            b.build(),
            Err(ConfigError::Invalid(ConfigField::AnimationInterval))
        );

        let mut b = make_builder();
        b.full_refresh_interval = Some(0);
        assert_eq!(
            b.build(),
            Err(ConfigError::Invalid(ConfigField::FullRefreshInterval))
        );
    }

    #[test]
    fn test_stop_without_lines_rejected() {
        let mut b = make_builder();
        b.add_stop("60200956").unwrap();
        assert_eq!(b.build(), Err(ConfigError::Invalid(ConfigField::Stops)));
    }

    #[test]
    fn test_duplicate_stop_rejected() {
        let mut b = make_builder();
        assert_eq!(b.add_stop("60201438"), Err(ConfigError::DuplicateStop));
    }

    #[test]
    fn test_budget_exceeds_display() {
        let mut b = make_builder();
        b.rows = Some(5);
        b.columns = Some(3);
        assert_eq!(b.build(), Err(ConfigError::BudgetExceedsDisplay));

        let mut b = make_builder();
        b.rows = Some(MAX_ROWS as u8 + 1);
        b.columns = Some(1);
        assert_eq!(b.build(), Err(ConfigError::Invalid(ConfigField::Rows)));
    }

    #[test]
    fn test_watchdog_too_short() {
        let mut b = make_builder();
        b.watchdog_timeout_ms = Some(1_000);
        assert_eq!(b.build(), Err(ConfigError::WatchdogTooShort));
    }

    #[test]
    fn test_restart_threshold_must_exceed_stale() {
        let mut b = make_builder();
        b.stale_restart_threshold_s = Some(60);
        assert_eq!(
            b.build(),
            Err(ConfigError::Invalid(ConfigField::StaleRestartThreshold))
        );
    }

    #[test]
    fn test_too_many_directions() {
        let mut b = ConfigBuilder::new();
        let stop = b.add_stop("1").unwrap();
        assert_eq!(
            b.add_line(stop, "U4", &["H", "R", "A", "B", "C"], 0),
            Err(ConfigError::TooMany(ConfigField::Stops))
        );
    }

    #[test]
    fn test_overlong_line_name_rejected() {
        let mut b = ConfigBuilder::new();
        let stop = b.add_stop("1").unwrap();
        assert_eq!(
            b.add_line(stop, "ThisIsNotALine", &[], 0),
            Err(ConfigError::Invalid(ConfigField::Stops))
        );
    }

    #[test]
    fn test_shortname_lookup() {
        let mut b = make_builder();
        b.add_shortname("Hütteldorf Bahnhof", "Hütteldorf").unwrap();
        let config = b.build().unwrap();
        assert_eq!(config.shortname("Hütteldorf Bahnhof"), Some("Hütteldorf"));
        assert_eq!(config.shortname("Westbahnhof"), None);
    }

    #[test]
    fn test_priority_duplicates_rejected() {
        let mut b = make_builder();
        assert_eq!(
            b.set_priority(&["49", "N49", "49"]),
            Err(ConfigError::Invalid(ConfigField::LinePriority))
        );
    }

    #[test]
    fn test_missing_priority_list() {
        let mut b = ConfigBuilder::new();
        let stop = b.add_stop("60201438").unwrap();
        b.add_line(stop, "49", &[], 0).unwrap();
        b.update_interval_s = Some(30);
        b.animation_interval_s = Some(1);
        b.full_refresh_interval = Some(40);
        b.stale_threshold_s = Some(60);
        b.watchdog_timeout_ms = Some(30_000);
        assert_eq!(
            b.clone().build(),
            Err(ConfigError::Missing(ConfigField::LinePriority))
        );

        b.set_priority(&["49"]).unwrap();
        let config = b.build().unwrap();
        assert_eq!(config.line_priority()[0].as_str(), "49");
    }

    #[test]
    fn test_direction_filter() {
        let config = make_builder().build().unwrap();
        let n49 = config.stops()[0].line("N49").unwrap();
        assert!(n49.accepts_direction("R"));
        assert!(!n49.accepts_direction("H"));
        let l49 = config.stops()[0].line("49").unwrap();
        assert!(l49.accepts_direction("H"));
    }
}
