//! Abfahrt desktop runner
//!
//! Runs the departure board core against the live monitor API, writing
//! the panel contents to a PBM image. Press Enter for a manual refresh.

mod board;
mod config;
mod error;
mod panel;
mod source;

use std::env;
use std::path::Path;
use std::process::ExitCode;

use abfahrt_core::engine::initialize;
use abfahrt_core::runner::{Board, Runner};
use abfahrt_core::traits::Clock;
use abfahrt_display::BufferedDisplay;
use getopts::Options;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::board::{LogLed, SoftWatchdog, StdDelay, StdinButton, SystemClock, EXIT_RESTART};
use crate::error::HostError;
use crate::panel::PbmPanel;
use crate::source::HttpSource;

/// Default PBM output path
const DEFAULT_FRAME_PATH: &str = "frame.pbm";

fn main() -> ExitCode {
    let mut opts = Options::new();
    opts.optopt(
        "c",
        "config",
        "Board configuration (default: embedded departures.toml)",
        "path",
    );
    opts.optopt(
        "o",
        "frame",
        "PBM image written on every panel refresh (default frame.pbm)",
        "path",
    );
    opts.optflag("h", "help", "Print this help");

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("abfahrt-host");
    let usage = format!("Usage: {} [-c config.toml] [-o frame.pbm]", program);

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            eprintln!("ERROR: {}\n{}", f, opts.usage(&usage));
            return ExitCode::FAILURE;
        }
    };
    if matches.opt_present("h") {
        print!("{}", opts.usage(&usage));
        return ExitCode::SUCCESS;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = matches.opt_str("c");
    let frame_path = matches
        .opt_str("o")
        .unwrap_or_else(|| DEFAULT_FRAME_PATH.to_string());

    match run(config_path.as_deref().map(Path::new), Path::new(&frame_path)) {
        Ok(()) => ExitCode::from(EXIT_RESTART as u8),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the configuration, assemble the board and run until a restart
fn run(config_path: Option<&Path>, frame_path: &Path) -> Result<(), HostError> {
    let config = match config_path {
        Some(path) => config::load_file(path)?,
        None => config::load_embedded()?,
    };

    let source = HttpSource::new(&config.api_url, &config.core)?;
    let watchdog = SoftWatchdog::start(config.core.watchdog_timeout_ms())?;
    let buttons = StdinButton::start()?;

    let mut clock = SystemClock::new();
    let core = initialize(config.core, clock.now());
    info!("panel: writing frames to {}", frame_path.display());

    let board = Board {
        clock,
        source,
        display: BufferedDisplay::new(PbmPanel::new(frame_path)),
        watchdog,
        buttons,
        led: LogLed::default(),
        delay: StdDelay,
    };

    let mut runner = Runner::new(core, board);
    let fault = runner.run();
    let panel = runner.board().display.panel();
    error!(
        "runner stopped: {:?} after {} full and {} partial refreshes",
        fault,
        panel.full_refreshes(),
        panel.partial_refreshes()
    );
    Ok(())
}
