//! Board capabilities on a desktop
//!
//! - Clock: `Instant` since start plus the system wall clock
//! - Delay: `thread::sleep`
//! - Watchdog: supervisor thread that exits the process when starved
//! - Refresh button: Enter on stdin
//! - Status LED: a log line on every change

use std::io::{self, BufRead};
use std::process;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use abfahrt_core::traits::{Buttons, Clock, Now, StatusLed, Watchdog};
use embedded_hal::delay::DelayNs;
use tracing::{error, info, warn};

use crate::error::HostError;

/// Exit code after a requested restart
pub const EXIT_RESTART: i32 = 2;

/// Exit code when the watchdog was starved
pub const EXIT_WATCHDOG: i32 = 3;

/// How often the supervisor checks the last feed
const WATCHDOG_CHECK_MS: u64 = 100;

/// Monotonic plus wall clock
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> Now {
        let unix_s = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Now::new(self.start.elapsed().as_millis() as u64, unix_s)
    }
}

/// Blocking delay
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Check whether a watchdog fed at `last_feed_ms` has expired
fn starved(last_feed_ms: u64, now_ms: u64, timeout_ms: u64) -> bool {
    now_ms.saturating_sub(last_feed_ms) > timeout_ms
}

/// Software watchdog
///
/// A supervisor thread compares the last feed against the timeout and
/// terminates the process when it is exceeded. A service manager is
/// expected to start it again.
pub struct SoftWatchdog {
    start: Instant,
    last_feed_ms: Arc<AtomicU64>,
}

impl SoftWatchdog {
    /// Arm the watchdog and start its supervisor thread
    pub fn start(timeout_ms: u32) -> Result<Self, HostError> {
        let start = Instant::now();
        let last_feed_ms = Arc::new(AtomicU64::new(0));

        let last_feed = Arc::clone(&last_feed_ms);
        let timeout_ms = timeout_ms as u64;
        thread::Builder::new()
            .name("watchdog".into())
            .spawn(move || loop {
                thread::sleep(Duration::from_millis(WATCHDOG_CHECK_MS));
                let now_ms = start.elapsed().as_millis() as u64;
                let fed = last_feed.load(Ordering::Relaxed);
                if starved(fed, now_ms, timeout_ms) {
                    error!(
                        "watchdog: not fed for {} ms (timeout {} ms), resetting",
                        now_ms - fed,
                        timeout_ms
                    );
                    process::exit(EXIT_WATCHDOG);
                }
            })
            .map_err(|source| HostError::Thread {
                name: "watchdog",
                source,
            })?;

        info!("watchdog: armed, {} ms", timeout_ms);
        Ok(Self {
            start,
            last_feed_ms,
        })
    }
}

impl Watchdog for SoftWatchdog {
    fn feed(&mut self) {
        let now_ms = self.start.elapsed().as_millis() as u64;
        self.last_feed_ms.store(now_ms, Ordering::Relaxed);
    }

    fn restart(&mut self) {
        warn!("watchdog: restart requested");
        process::exit(EXIT_RESTART);
    }
}

/// Refresh button on stdin
///
/// A reader thread turns every line into one press. Each press reads as
/// pressed for exactly one sample, so the runner sees a clean edge.
pub struct StdinButton {
    pending: Arc<AtomicBool>,
    was_pressed: bool,
}

impl StdinButton {
    pub fn start() -> Result<Self, HostError> {
        let pending = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&pending);
        thread::Builder::new()
            .name("stdin-button".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    if line.is_err() {
                        break;
                    }
                    info!("button: manual refresh");
                    flag.store(true, Ordering::Relaxed);
                }
            })
            .map_err(|source| HostError::Thread {
                name: "stdin-button",
                source,
            })?;
        Ok(Self::with_flag(pending))
    }

    fn with_flag(pending: Arc<AtomicBool>) -> Self {
        Self {
            pending,
            was_pressed: false,
        }
    }
}

impl Buttons for StdinButton {
    fn refresh_pressed(&mut self) -> bool {
        // A press right after a press is held back one sample
        let pressed = !self.was_pressed && self.pending.swap(false, Ordering::Relaxed);
        self.was_pressed = pressed;
        pressed
    }
}

/// Status LED shown as log lines
#[derive(Debug, Default)]
pub struct LogLed {
    on: bool,
}

impl StatusLed for LogLed {
    fn set(&mut self, on: bool) {
        if on == self.on {
            return;
        }
        self.on = on;
        if on {
            warn!("status LED on: departures stale or unavailable");
        } else {
            info!("status LED off: departures fresh");
        }
    }
}
