//! Bridge configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use engine::EngineOptions;
use engine::consts::{DEFAULT_STAGE_HEIGHT, DEFAULT_STAGE_WIDTH};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_MEMORY_BUDGET_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_INIT_TIMEOUT_MS: u64 = 0;
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub stage_width: u32,
    pub stage_height: u32,
    pub max_upload_bytes: usize,
    pub memory_budget_bytes: usize,
    /// `None` waits for startup indefinitely.
    pub init_timeout: Option<Duration>,
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            stage_width: DEFAULT_STAGE_WIDTH,
            stage_height: DEFAULT_STAGE_HEIGHT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            init_timeout: None,
            log_level: DEFAULT_LOG_LEVEL.into(),
        }
    }
}

impl BridgeConfig {
    /// Build config from environment variables. Unset or unparsable values
    /// fall back to their defaults; out-of-range stage sizes are passed through
    /// and rejected by the engine at `initialize` time.
    ///
    /// - `EASEL_STAGE_WIDTH`: default 800
    /// - `EASEL_STAGE_HEIGHT`: default 600
    /// - `EASEL_MAX_UPLOAD_BYTES`: default 16 MiB
    /// - `EASEL_MEMORY_BUDGET_BYTES`: default 16 MiB
    /// - `EASEL_INIT_TIMEOUT_MS`: default 0 (no timeout)
    /// - `EASEL_LOG`: default `info`
    #[must_use]
    pub fn from_env() -> Self {
        let timeout_ms = env_parse("EASEL_INIT_TIMEOUT_MS", DEFAULT_INIT_TIMEOUT_MS);
        Self {
            stage_width: env_parse("EASEL_STAGE_WIDTH", DEFAULT_STAGE_WIDTH),
            stage_height: env_parse("EASEL_STAGE_HEIGHT", DEFAULT_STAGE_HEIGHT),
            max_upload_bytes: env_parse("EASEL_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            memory_budget_bytes: env_parse("EASEL_MEMORY_BUDGET_BYTES", DEFAULT_MEMORY_BUDGET_BYTES),
            init_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
            log_level: std::env::var("EASEL_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
        }
    }

    /// Startup options handed to the engine.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            width: self.stage_width,
            height: self.stage_height,
            max_upload_bytes: self.max_upload_bytes,
            memory_budget: self.memory_budget_bytes,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
