//! Stop filter query
//!
//! The proxy only returns lines named in the `filter` parameter, a JSON
//! array of `{ diva, lines: [{ name, direction? }] }`.

use alloc::string::String;
use alloc::vec::Vec;

use abfahrt_core::config::StopFilter;
use serde::Serialize;

#[derive(Serialize)]
struct StopQuery<'a> {
    diva: &'a str,
    lines: Vec<LineQuery<'a>>,
}

#[derive(Serialize)]
struct LineQuery<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<&'a str>,
}

/// Build the JSON filter for the configured stops
///
/// A line with exactly one accepted direction narrows the query to it.
/// With several, the query asks for all and the aggregator filters.
pub fn filter_json(stops: &[StopFilter]) -> Result<String, serde_json::Error> {
    let query: Vec<StopQuery<'_>> = stops
        .iter()
        .map(|stop| StopQuery {
            diva: stop.stop.as_str(),
            lines: stop
                .lines
                .iter()
                .map(|line| LineQuery {
                    name: line.name.as_str(),
                    direction: match line.directions.as_slice() {
                        [only] => Some(only.as_str()),
                        _ => None,
                    },
                })
                .collect(),
        })
        .collect();
    serde_json::to_string(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use abfahrt_core::config::ConfigBuilder;

    #[test]
    fn test_filter_json() {
        let mut b = ConfigBuilder::new();
        let stop = b.add_stop("60201438").unwrap();
        b.add_line(stop, "49", &[], 0).unwrap();
        b.add_line(stop, "N49", &["R"], 0).unwrap();
        let stop = b.add_stop("60200956").unwrap();
        b.add_line(stop, "U4", &["H", "R"], 6).unwrap();
        b.set_priority(&[]).unwrap();
        b.update_interval_s = Some(30);
        b.animation_interval_s = Some(1);
        b.full_refresh_interval = Some(40);
        b.stale_threshold_s = Some(60);
        b.watchdog_timeout_ms = Some(30_000);
        let config = b.build().unwrap();

        assert_eq!(
            filter_json(config.stops()).unwrap(),
            r#"[{"diva":"60201438","lines":[{"name":"49"},{"name":"N49","direction":"R"}]},{"diva":"60200956","lines":[{"name":"U4"}]}]"#
        );
    }
}
