//! Environment-driven configuration.
//!
//! Every knob has a sensible default so the service runs with an empty
//! environment; variables override individual values.

use conference_central_core::RetryPolicy;
use std::env;
use std::time::Duration;

/// Retry knobs for transaction conflict handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,
    /// Backoff delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on the backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 5,
            max_delay_ms: 250,
        }
    }
}

impl RetryConfig {
    /// Build the [`RetryPolicy`] the service hands to its transaction loop.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.max_retries)
            .initial_delay(Duration::from_millis(self.initial_delay_ms))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .build()
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Conflict retry settings.
    pub retry: RetryConfig,
    /// Seats-available threshold for the sell-out announcement.
    pub sellout_threshold: u32,
    /// Log filter directive, `RUST_LOG` style.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            sellout_threshold: crate::announce::DEFAULT_SELLOUT_THRESHOLD,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            retry: RetryConfig {
                max_retries: env::var("REGISTRATION_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.max_retries),
                initial_delay_ms: env::var("REGISTRATION_RETRY_INITIAL_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.initial_delay_ms),
                max_delay_ms: env::var("REGISTRATION_RETRY_MAX_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.max_delay_ms),
            },
            sellout_threshold: env::var("ANNOUNCEMENT_SELLOUT_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sellout_threshold),
            log_filter: env::var("RUST_LOG").unwrap_or(defaults.log_filter),
        }
    }
}
