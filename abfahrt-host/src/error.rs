//! Host runner errors
//!
//! Everything here is fatal at start-up. Once the runner loop is going,
//! failures are handled by the core and never surface as `HostError`.

use std::path::PathBuf;

use abfahrt_core::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config syntax: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Config(ConfigError),
    #[error("invalid api_url: {0}")]
    ApiUrl(String),
    #[error("encoding stop filter: {0}")]
    Filter(#[from] serde_json::Error),
    #[error("HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("starting {name} thread: {source}")]
    Thread {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl From<ConfigError> for HostError {
    fn from(err: ConfigError) -> Self {
        HostError::Config(err)
    }
}
