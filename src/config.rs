use std::time::Duration;

use crate::error::config::ConfigError;

/// Application configuration sourced from environment variables.
///
/// Required variables: `DATABASE_URL`, `JWT_SECRET`. All cache, retry, and
/// timeout tunables have documented defaults and are only overridden when the
/// corresponding variable is set.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_address: String,
    pub cache: CacheSettings,
    pub retry: RetrySettings,
    /// Hard deadline applied to every store operation.
    pub store_timeout: Duration,
}

/// TTL cache tunables.
#[derive(Clone, Debug)]
pub struct CacheSettings {
    /// TTL applied when no entry-specific TTL is given.
    pub default_ttl: Duration,
    /// TTL for a refreshed favorites view.
    pub favorites_ttl: Duration,
    /// Short TTL for the default view written on a cache miss; bounds the
    /// request-coalescing window while a background refresh is in flight.
    pub placeholder_ttl: Duration,
    /// TTL for cached user profiles.
    pub user_ttl: Duration,
    /// Hard cap on entry count.
    pub max_entries: usize,
    /// Cadence of the periodic expired-entry sweep.
    pub sweep_interval: Duration,
}

/// Retry tunables for store operations.
#[derive(Clone, Debug)]
pub struct RetrySettings {
    /// Retries after the first attempt; an operation failing transiently
    /// every time is attempted `max_retries + 1` times in total.
    pub max_retries: u32,
    /// Backoff unit; the delay before retry `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            server_address: optional("SERVER_ADDRESS")
                .unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cache: CacheSettings {
                default_ttl: secs("CACHE_DEFAULT_TTL_SECS", 60)?,
                favorites_ttl: secs("CACHE_FAVORITES_TTL_SECS", 300)?,
                placeholder_ttl: secs("CACHE_PLACEHOLDER_TTL_SECS", 10)?,
                user_ttl: secs("CACHE_USER_TTL_SECS", 1800)?,
                max_entries: count("CACHE_MAX_ENTRIES", 1000)?,
                sweep_interval: secs("CACHE_SWEEP_INTERVAL_SECS", 30)?,
            },
            retry: RetrySettings {
                max_retries: count("RETRY_MAX_RETRIES", 2)? as u32,
                base_delay: millis("RETRY_BASE_DELAY_MS", 1000)?,
            },
            store_timeout: millis("STORE_TIMEOUT_MS", 5000)?,
        })
    }
}

fn require(var: &str) -> Result<String, ConfigError> {
    std::env::var(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
}

fn optional(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn parse_u64(var: &str, default: u64) -> Result<u64, ConfigError> {
    match optional(var) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: format!("expected a non-negative integer, got {raw:?}"),
        }),
        None => Ok(default),
    }
}

fn secs(var: &str, default: u64) -> Result<Duration, ConfigError> {
    parse_u64(var, default).map(Duration::from_secs)
}

fn millis(var: &str, default: u64) -> Result<Duration, ConfigError> {
    parse_u64(var, default).map(Duration::from_millis)
}

fn count(var: &str, default: u64) -> Result<usize, ConfigError> {
    parse_u64(var, default).map(|n| n as usize)
}
