//! Environment-driven application configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` URL.
pub const DATABASE_URL_VAR: &str = "CORKBOARD_DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const DB_POOL_SIZE_VAR: &str = "CORKBOARD_DB_POOL_SIZE";
/// Environment variable holding the column listing cache TTL in seconds.
pub const CACHE_TTL_SECS_VAR: &str = "CORKBOARD_CACHE_TTL_SECS";
/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_VAR: &str = "CORKBOARD_LOG";

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used.
    #[error("invalid value {value:?} for {key}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: u32,
    /// Lifetime of cached column listings.
    pub cache_ttl: Duration,
    /// Tracing filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_pool_size: DEFAULT_POOL_SIZE,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unparseable numeric values or a
    /// zero pool size.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `lookup`, treating blank values as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unparseable numeric values or a
    /// zero pool size.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let db_pool_size = parse_or(read(DB_POOL_SIZE_VAR), DB_POOL_SIZE_VAR, DEFAULT_POOL_SIZE)?;
        if db_pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: DB_POOL_SIZE_VAR,
                value: db_pool_size.to_string(),
            });
        }
        let ttl_secs = parse_or(
            read(CACHE_TTL_SECS_VAR),
            CACHE_TTL_SECS_VAR,
            DEFAULT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            database_url: read(DATABASE_URL_VAR),
            db_pool_size,
            cache_ttl: Duration::from_secs(ttl_secs),
            log_filter: read(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    raw.map_or(Ok(default), |value| {
        value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value })
    })
}
