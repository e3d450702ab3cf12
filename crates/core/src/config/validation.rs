//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `service_key` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `render_timeout_ms` is 0 or exceeds 5 minutes
    /// - `settle_max_checks` is 0
    /// - `settle_initial_delay_ms` is 0 or exceeds `settle_max_delay_ms`
    /// - `fetch_timeout_secs` is 0 or not shorter than `cache_timeout_secs`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_key.is_empty() {
            return Err(ConfigError::Missing {
                field: "service_key".into(),
                hint: "Set PRERENDER_SERVICE_KEY environment variable".into(),
            });
        }

        if self.render_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "render_timeout_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.render_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "render_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.settle_max_checks == 0 {
            return Err(ConfigError::Invalid {
                field: "settle_max_checks".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.settle_initial_delay_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "settle_initial_delay_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.settle_initial_delay_ms > self.settle_max_delay_ms {
            return Err(ConfigError::Invalid {
                field: "settle_initial_delay_ms".into(),
                reason: "must not exceed settle_max_delay_ms".into(),
            });
        }

        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.fetch_timeout_secs >= self.cache_timeout_secs {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_secs".into(),
                reason: "must be shorter than cache_timeout_secs".into(),
            });
        }

        Ok(())
    }
}
