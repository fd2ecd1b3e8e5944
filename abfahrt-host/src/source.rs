//! Live departure source over HTTP
//!
//! One blocking GET per fetch against the monitor proxy, with the stop
//! filter as a percent-encoded `filter` query parameter.

use std::time::Duration;

use abfahrt_core::config::Config;
use abfahrt_core::departures::{Connectivity, RawBatch};
use abfahrt_core::error::{FetchError, NetworkError};
use abfahrt_core::traits::DepartureSource;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, warn};

use crate::error::HostError;

/// Upper bound on one request, connect to last byte
pub const REQUEST_TIMEOUT_MS: u32 = 10_000;

/// Build the request URL for a stop filter list
pub fn request_url(base: &str, config: &Config) -> Result<String, HostError> {
    let filter = abfahrt_monitor::filter_json(config.stops())?;
    Ok(format!(
        "{}?filter={}",
        base,
        utf8_percent_encode(&filter, NON_ALPHANUMERIC)
    ))
}

/// Map a transport failure to the core taxonomy
fn network_error(err: &reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout
    } else if err.is_connect() {
        NetworkError::Disconnected
    } else if let Some(status) = err.status() {
        NetworkError::Status(status.as_u16())
    } else {
        NetworkError::Transport
    }
}

/// `DepartureSource` backed by a blocking reqwest client
pub struct HttpSource {
    client: Client,
    url: String,
    /// Last request reached the server
    reachable: bool,
}

impl HttpSource {
    pub fn new(api_url: &str, config: &Config) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS as u64))
            .build()?;
        let url = request_url(api_url, config)?;
        debug!("source: {}", url);
        Ok(Self {
            client,
            url,
            reachable: false,
        })
    }

    fn get(&self) -> Result<Vec<u8>, NetworkError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| {
                warn!("source: request failed: {}", e);
                network_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        let body = response.bytes().map_err(|e| {
            warn!("source: reading body failed: {}", e);
            network_error(&e)
        })?;
        Ok(body.to_vec())
    }
}

impl DepartureSource for HttpSource {
    fn fetch(&mut self) -> Result<RawBatch, FetchError> {
        let body = match self.get() {
            Ok(body) => body,
            Err(err) => {
                // A status code means the link itself works
                self.reachable = matches!(err, NetworkError::Status(_));
                return Err(err.into());
            }
        };
        self.reachable = true;
        debug!("source: {} bytes", body.len());
        Ok(abfahrt_monitor::decode(&body)?)
    }

    /// A desktop link has no signal strength; full bars while reachable
    fn connectivity(&self) -> Connectivity {
        if self.reachable {
            Connectivity::Level(Connectivity::MAX_LEVEL)
        } else {
            Connectivity::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abfahrt_core::config::ConfigBuilder;

    fn make_config() -> Config {
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
        b.build().unwrap()
    }

    #[test]
    fn test_request_url_encodes_filter() {
        let url = request_url("https://proxy.example/monitor", &make_config()).unwrap();
        let (base, query) = url.split_once('?').unwrap();
        assert_eq!(base, "https://proxy.example/monitor");
        let encoded = query.strip_prefix("filter=").unwrap();
        assert!(encoded.starts_with("%5B%7B%22diva%22%3A%2260201438%22"));
        assert!(!encoded.contains('"'));
        assert!(!encoded.contains(' '));
        assert!(encoded.contains("N49"));
    }

    #[test]
    fn test_starts_disconnected() {
        let source = HttpSource::new("http://127.0.0.1:9/monitor", &make_config()).unwrap();
        assert_eq!(source.connectivity(), Connectivity::Disconnected);
    }
}
