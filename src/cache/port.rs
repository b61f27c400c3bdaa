//! Cache port shared by the in-memory backend and request-scoped sessions.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value cache with optional per-entry time-to-live.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Stores `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Removes the entry under `key`. Missing keys are ignored.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Removes every entry whose key starts with `prefix`.
    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<()>;
}

/// Errors returned by cache implementations.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    /// The request-scoped session has already been committed or rolled back.
    #[error("cache session is closed")]
    SessionClosed,

    /// Backend failure.
    #[error("cache backend error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl CacheError {
    /// Wraps a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
