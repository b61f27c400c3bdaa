//! Process-local cache backend.
//!
//! The composition root constructs one [`InMemoryCache`] and hands clones of
//! the `Arc` to whichever component needs it; there is no global instance.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::port::{Cache, CacheError, CacheResult};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expiry| now < expiry)
    }
}

/// Thread-safe in-memory cache with lazy TTL expiry.
#[derive(Debug, Clone)]
pub struct InMemoryCache<C = DefaultClock>
where
    C: Clock,
{
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<C>,
}

impl InMemoryCache<DefaultClock> {
    /// Creates an empty cache backed by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryCache<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryCache<C>
where
    C: Clock,
{
    /// Creates an empty cache using the given clock for expiry decisions.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Returns the number of stored entries, including expired ones not yet
    /// evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned(err: impl std::fmt::Display) -> CacheError {
    CacheError::backend(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl<C> Cache for InMemoryCache<C>
where
    C: Clock + Send + Sync + 'static,
{
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        let expires_at = match ttl {
            Some(duration) => {
                let delta = TimeDelta::from_std(duration).map_err(CacheError::backend)?;
                Some(self.clock.utc() + delta)
            }
            None => None,
        };
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_owned(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.utc();
        let mut entries = self.entries.write().map_err(poisoned)?;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
