//! Tracing subscriber installation.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already initialised")]
    AlreadyInitialised,
}

/// Installs a formatted subscriber filtered by `filter`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for malformed directives and
/// [`TelemetryError::AlreadyInitialised`] when called twice.
pub fn init_tracing(filter: &str) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(filter).map_err(|err| TelemetryError::InvalidFilter {
        directive: filter.to_owned(),
        message: err.to_string(),
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialised)
}
