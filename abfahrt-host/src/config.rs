//! Configuration loading
//!
//! Reads the TOML board configuration and validates it into the core
//! `Config`. Field names follow the core's `ConfigField::key` names.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use abfahrt_core::config::{Config, ConfigBuilder};
use abfahrt_core::error::{ConfigError, ConfigField};
use abfahrt_core::engine::WATCHDOG_MARGIN_MS;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::HostError;
use crate::source::REQUEST_TIMEOUT_MS;

/// Configuration compiled into the binary
pub const EMBEDDED_CONFIG: &str = include_str!("../departures.toml");

/// Proxy used when the file does not name one
pub const DEFAULT_API_URL: &str = "https://wl-proxy.monsjovis.dev/monitor/next-departures";

/// Validated host configuration
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub core: Config,
    pub api_url: String,
}

/// File layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    stops: Vec<StopEntry>,
    line_priority: Option<Vec<String>>,
    update_interval_sec: Option<u32>,
    animation_interval_sec: Option<u32>,
    full_refresh_interval_cycles: Option<u16>,
    stale_threshold_sec: Option<u32>,
    stale_restart_threshold_sec: Option<u32>,
    watchdog_timeout_ms: Option<u32>,
    rows: Option<u8>,
    columns: Option<u8>,
    utc_offset_min: Option<i16>,
    #[serde(default)]
    destination_shortnames: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StopEntry {
    diva: String,
    lines: Vec<LineEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LineEntry {
    name: String,
    /// Single accepted direction
    direction: Option<String>,
    /// Several accepted directions
    directions: Option<Vec<String>>,
    /// Walking time to the stop in minutes
    #[serde(default)]
    walk_min: u16,
}

impl LineEntry {
    /// Accepted directions; setting both forms is rejected
    fn directions(&self) -> Result<Vec<&str>, ConfigError> {
        match (&self.direction, &self.directions) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(ConfigField::Stops)),
            (Some(one), None) => Ok(vec![one.as_str()]),
            (None, Some(many)) => Ok(many.iter().map(String::as_str).collect()),
            (None, None) => Ok(Vec::new()),
        }
    }
}

/// Load a configuration file
pub fn load_file(path: &Path) -> Result<HostConfig, HostError> {
    let text = fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    info!("config: loading {}", path.display());
    parse(&text)
}

/// Load the configuration compiled into the binary
pub fn load_embedded() -> Result<HostConfig, HostError> {
    info!("config: using embedded departures.toml");
    parse(EMBEDDED_CONFIG)
}

/// Parse and validate configuration text
pub fn parse(text: &str) -> Result<HostConfig, HostError> {
    let file: FileConfig = toml::from_str(text)?;

    let mut builder = ConfigBuilder::new();
    for stop in &file.stops {
        let index = builder.add_stop(&stop.diva)?;
        for line in &stop.lines {
            builder.add_line(index, &line.name, &line.directions()?, line.walk_min)?;
        }
    }
    if let Some(priority) = &file.line_priority {
        let names: Vec<&str> = priority.iter().map(String::as_str).collect();
        builder.set_priority(&names)?;
    }
    for (from, to) in &file.destination_shortnames {
        builder.add_shortname(from, to)?;
    }

    builder.update_interval_s = file.update_interval_sec;
    builder.animation_interval_s = file.animation_interval_sec;
    builder.full_refresh_interval = file.full_refresh_interval_cycles;
    builder.stale_threshold_s = file.stale_threshold_sec;
    builder.stale_restart_threshold_s = file.stale_restart_threshold_sec;
    builder.watchdog_timeout_ms = file.watchdog_timeout_ms;
    builder.rows = file.rows;
    builder.columns = file.columns;
    builder.utc_offset_min = file.utc_offset_min;

    let core = builder.build()?;

    // A fetch blocks for up to the request timeout between two feeds
    if core.watchdog_timeout_ms() < REQUEST_TIMEOUT_MS + WATCHDOG_MARGIN_MS {
        return Err(ConfigError::WatchdogTooShort.into());
    }

    let api_url = file.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        return Err(HostError::ApiUrl(api_url));
    }

    debug!(
        "config: {} stops, {} priority lines, {}x{} budget",
        core.stops().len(),
        core.line_priority().len(),
        core.rows(),
        core.columns()
    );
    Ok(HostConfig { core, api_url })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        line_priority = []
        update_interval_sec = 30
        animation_interval_sec = 1
        full_refresh_interval_cycles = 40
        stale_threshold_sec = 60
        watchdog_timeout_ms = 30000

        [[stops]]
        diva = "60201438"
        lines = [{ name = "49" }]
    "#;

    fn config_error(text: &str) -> ConfigError {
        match parse(text) {
            Err(HostError::Config(err)) => err,
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_embedded_config_is_valid() {
        let config = load_embedded().unwrap();
        assert_eq!(config.core.stops().len(), 3);
        assert_eq!(config.core.rows(), 5);
        assert_eq!(config.core.columns(), 2);
        assert_eq!(config.core.utc_offset_min(), 60);
        assert_eq!(config.core.shortname("Hütteldorf Bahnhof"), Some("Hütteldorf"));
        assert!(config.api_url.starts_with("https://"));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.core.update_interval_s(), 30);
        assert_eq!(config.core.stale_restart_threshold_s(), 600);
        assert!(config.core.line_priority().is_empty());
    }

    #[test]
    fn test_direction_forms() {
        let text = MINIMAL.replace(
            r#"lines = [{ name = "49" }]"#,
            r#"lines = [
                { name = "49" },
                { name = "N49", direction = "R" },
                { name = "U4", directions = ["H", "R"], walk_min = 3 },
            ]"#,
        );
        let config = parse(&text).unwrap();
        let stop = &config.core.stops()[0];

        let n49 = stop.line("N49").unwrap();
        assert!(n49.accepts_direction("R"));
        assert!(!n49.accepts_direction("H"));

        let u4 = stop.line("U4").unwrap();
        assert!(u4.accepts_direction("H"));
        assert!(u4.accepts_direction("R"));
        assert_eq!(u4.min_countdown, 3);

        assert!(stop.line("49").unwrap().accepts_direction("anything"));
    }

    #[test]
    fn test_missing_field_is_named() {
        let text = MINIMAL.replace("update_interval_sec = 30", "");
        assert_eq!(
            config_error(&text),
            ConfigError::Missing(ConfigField::UpdateInterval)
        );
    }

    #[test]
    fn test_missing_priority_list_rejected() {
        let text = MINIMAL.replace("line_priority = []", "");
        assert_eq!(
            config_error(&text),
            ConfigError::Missing(ConfigField::LinePriority)
        );

        let text = MINIMAL.replace("line_priority = []", r#"line_priority = ["49"]"#);
        let config = parse(&text).unwrap();
        assert_eq!(config.core.line_priority()[0].as_str(), "49");
    }

    #[test]
    fn test_both_direction_forms_rejected() {
        let text = MINIMAL.replace(
            r#"lines = [{ name = "49" }]"#,
            r#"lines = [{ name = "49", direction = "H", directions = ["R"] }]"#,
        );
        assert_eq!(config_error(&text), ConfigError::Invalid(ConfigField::Stops));
    }

    #[test]
    fn test_no_stops_rejected() {
        let text = MINIMAL.split("[[stops]]").next().unwrap().to_string();
        assert_eq!(config_error(&text), ConfigError::Missing(ConfigField::Stops));
    }

    #[test]
    fn test_watchdog_must_cover_request_timeout() {
        let text = MINIMAL.replace("watchdog_timeout_ms = 30000", "watchdog_timeout_ms = 5000");
        assert_eq!(config_error(&text), ConfigError::WatchdogTooShort);
    }

    #[test]
    fn test_over_budget_layout_rejected() {
        let text = format!("rows = 8\ncolumns = 2\n{}", MINIMAL);
        assert_eq!(config_error(&text), ConfigError::BudgetExceedsDisplay);
    }

    #[test]
    fn test_unknown_key_is_syntax_error() {
        let text = format!("refresh_every = 5\n{}", MINIMAL);
        assert!(matches!(parse(&text), Err(HostError::Toml(_))));
    }

    #[test]
    fn test_bad_api_url() {
        let text = format!("api_url = \"ftp://example\"\n{}", MINIMAL);
        assert!(matches!(parse(&text), Err(HostError::ApiUrl(_))));
    }
}
