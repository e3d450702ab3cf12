//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRERENDER_*)
//! 2. TOML config file (if PRERENDER_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRERENDER_*)
/// 2. TOML config file (if PRERENDER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared secret key required on every page request.
    ///
    /// Set via PRERENDER_SERVICE_KEY environment variable.
    #[serde(default)]
    pub service_key: String,

    /// Path to the SQLite page store.
    ///
    /// Set via PRERENDER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Address the HTTP gateway binds to.
    ///
    /// Set via PRERENDER_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Hard bound on a single render, in milliseconds.
    ///
    /// Set via PRERENDER_RENDER_TIMEOUT_MS environment variable.
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Cap on a single settle-poll wait, in milliseconds.
    ///
    /// Set via PRERENDER_SETTLE_MAX_DELAY_MS environment variable.
    #[serde(default = "default_settle_max_delay_ms")]
    pub settle_max_delay_ms: u64,

    /// First settle-poll wait, in milliseconds. Doubles up to the cap.
    ///
    /// Set via PRERENDER_SETTLE_INITIAL_DELAY_MS environment variable.
    #[serde(default = "default_settle_initial_delay_ms")]
    pub settle_initial_delay_ms: u64,

    /// Number of settle checks bounding the polling loop.
    ///
    /// Worst-case settle wait is `settle_max_checks * settle_max_delay_ms`.
    /// Set via PRERENDER_SETTLE_MAX_CHECKS environment variable.
    #[serde(default = "default_settle_max_checks")]
    pub settle_max_checks: u32,

    /// How long an in-progress fetch is trusted before being presumed
    /// crashed, in seconds.
    ///
    /// Set via PRERENDER_FETCH_TIMEOUT_SECS environment variable.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// How long completed content is trusted before re-rendering, in seconds.
    ///
    /// Set via PRERENDER_CACHE_TIMEOUT_SECS environment variable.
    #[serde(default = "default_cache_timeout_secs")]
    pub cache_timeout_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./prerender-cache.sqlite")
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_render_timeout_ms() -> u64 {
    12_000
}

fn default_settle_max_delay_ms() -> u64 {
    1_000
}

fn default_settle_initial_delay_ms() -> u64 {
    200
}

fn default_settle_max_checks() -> u32 {
    2
}

fn default_fetch_timeout_secs() -> u64 {
    60
}

fn default_cache_timeout_secs() -> u64 {
    15 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_key: String::new(),
            db_path: default_db_path(),
            bind_addr: default_bind_addr(),
            render_timeout_ms: default_render_timeout_ms(),
            settle_max_delay_ms: default_settle_max_delay_ms(),
            settle_initial_delay_ms: default_settle_initial_delay_ms(),
            settle_max_checks: default_settle_max_checks(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            cache_timeout_secs: default_cache_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Render timeout as a Duration.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// Trust window for an in-progress fetch.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Trust window for completed content.
    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRERENDER_`
    /// 2. TOML file from `PRERENDER_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRERENDER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRERENDER_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
