//! Log output installation.
//!
//! Native builds install a `tracing_subscriber` `fmt` layer on stdout. A
//! browser has no stdout and no clock `std` can read, so the wasm build sets a
//! console panic hook and routes `tracing` events through `log` into
//! `console_log` instead.

#[cfg(test)]
#[path = "logging_test.rs"]
mod logging_test;

use tracing::{Level, debug, warn};

use crate::config::BridgeConfig;

/// Where log lines end up on this build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    BrowserConsole,
}

#[must_use]
pub fn sink() -> Sink {
    if cfg!(all(feature = "wasm", target_arch = "wasm32")) { Sink::BrowserConsole } else { Sink::Stdout }
}

/// Install the logger for this target at the configured level.
///
/// Safe to call more than once; only the first call installs anything. An
/// unrecognised level falls back to `info`.
pub fn init(config: &BridgeConfig) {
    let (level, recognised) = match parse_level(&config.log_level) {
        Some(level) => (level, true),
        None => (Level::INFO, false),
    };
    if let Err(e) = install(level) {
        debug!(error = %e, "logger already installed");
        return;
    }
    if !recognised {
        warn!(requested = %config.log_level, "unknown log level; using info");
    }
    debug!(%level, sink = ?sink(), "logging initialized");
}

fn parse_level(raw: &str) -> Option<Level> {
    match raw.trim().parse::<Level>() {
        Ok(level) => Some(level),
        Err(_) => None,
    }
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn install(level: Level) -> Result<(), String> {
    tracing_subscriber::fmt().with_max_level(level).try_init().map_err(|e| e.to_string())
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn install(level: Level) -> Result<(), String> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(console_level(level)).map_err(|e| e.to_string())
}

#[cfg(all(feature = "wasm", any(target_arch = "wasm32", test)))]
fn console_level(level: Level) -> log::Level {
    match level {
        Level::ERROR => log::Level::Error,
        Level::WARN => log::Level::Warn,
        Level::INFO => log::Level::Info,
        Level::DEBUG => log::Level::Debug,
        _ => log::Level::Trace,
    }
}
