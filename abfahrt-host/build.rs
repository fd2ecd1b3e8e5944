//! Build script for abfahrt-host
//!
//! Validates the embedded departures.toml at compile time, so a broken
//! default configuration never reaches a binary.

use std::fs;
use std::path::Path;

/// Integer settings that must be present and positive
const REQUIRED_POSITIVE: &[&str] = &[
    "update_interval_sec",
    "animation_interval_sec",
    "full_refresh_interval_cycles",
    "stale_threshold_sec",
    "watchdog_timeout_ms",
];

/// Screen body rows available for departures
const BODY_ROWS: i64 = 12;

fn main() {
    validate_config();
}

/// Validate departures.toml
fn validate_config() {
    println!("cargo:rerun-if-changed=departures.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("departures.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read departures.toml                           ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in departures.toml                   ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_settings(&config, &mut errors);
    validate_stops(&config, &mut errors);
    report("Invalid departures.toml", &errors);
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate top-level scalar settings
fn validate_settings(config: &toml::Value, errors: &mut Vec<String>) {
    for key in REQUIRED_POSITIVE {
        match config.get(key) {
            None => errors.push(format!("missing '{}'", key)),
            Some(toml::Value::Integer(n)) if *n > 0 => {}
            Some(_) => errors.push(format!("'{}' must be a positive integer", key)),
        }
    }

    if let (Some(toml::Value::Integer(stale)), Some(toml::Value::Integer(restart))) = (
        config.get("stale_threshold_sec"),
        config.get("stale_restart_threshold_sec"),
    ) {
        if restart <= stale {
            errors.push("stale_restart_threshold_sec must exceed stale_threshold_sec".into());
        }
    }

    let rows = config.get("rows").and_then(|v| v.as_integer()).unwrap_or(4);
    let columns = config.get("columns").and_then(|v| v.as_integer()).unwrap_or(3);
    if rows < 1 || columns < 1 || rows * columns > BODY_ROWS {
        errors.push(format!(
            "rows x columns must fit {} screen rows (got {}x{})",
            BODY_ROWS, rows, columns
        ));
    }

    match config.get("line_priority") {
        Some(toml::Value::Array(lines)) if lines.iter().all(|l| l.is_str()) => {}
        Some(_) => errors.push("'line_priority' must be a list of line names".into()),
        None => errors.push("missing 'line_priority' (use [] for no preference)".into()),
    }

    if let Some(url) = config.get("api_url") {
        match url.as_str() {
            Some(s) if s.starts_with("http://") || s.starts_with("https://") => {}
            _ => errors.push("'api_url' must be an http(s) URL".into()),
        }
    }
}

/// Validate the stop filter list
fn validate_stops(config: &toml::Value, errors: &mut Vec<String>) {
    let stops = match config.get("stops") {
        Some(toml::Value::Array(stops)) if !stops.is_empty() => stops,
        _ => {
            errors.push("at least one [[stops]] entry is required".into());
            return;
        }
    };

    for (i, stop) in stops.iter().enumerate() {
        let Some(table) = stop.as_table() else {
            errors.push(format!("stops[{}] must be a table", i));
            continue;
        };
        match table.get("diva").and_then(|d| d.as_str()) {
            Some(diva) if !diva.is_empty() => {}
            _ => errors.push(format!("stops[{}] missing 'diva'", i)),
        }

        let Some(lines) = table.get("lines").and_then(|l| l.as_array()) else {
            errors.push(format!("stops[{}] missing 'lines'", i));
            continue;
        };
        for (j, line) in lines.iter().enumerate() {
            if line.get("name").and_then(|n| n.as_str()).is_none() {
                errors.push(format!("stops[{}].lines[{}] missing 'name'", i, j));
            }
            if line.get("direction").is_some() && line.get("directions").is_some() {
                errors.push(format!(
                    "stops[{}].lines[{}] sets both 'direction' and 'directions'",
                    i, j
                ));
            }
        }
    }
}
