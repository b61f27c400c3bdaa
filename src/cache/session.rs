//! Request-scoped cache session that defers writes until commit.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::port::{Cache, CacheError, CacheResult};
use crate::transaction::{Committer, TransactionError, TransactionResult};

const LABEL: &str = "cache";

#[derive(Debug, Clone)]
enum StagedOp {
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Delete(String),
    DeleteByPrefix(String),
}

impl StagedOp {
    /// Returns `Some(Some(value))` when the op sets `key`, `Some(None)` when
    /// it removes `key`, and `None` when the op does not touch it.
    fn effect_on(&self, key: &str) -> Option<Option<String>> {
        match self {
            Self::Set {
                key: staged_key,
                value,
                ..
            } if staged_key == key => Some(Some(value.clone())),
            Self::Delete(staged_key) if staged_key == key => Some(None),
            Self::DeleteByPrefix(prefix) if key.starts_with(prefix.as_str()) => Some(None),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    staged: Vec<StagedOp>,
    finished: bool,
}

/// Cache view bound to one request.
///
/// Reads see the request's own staged writes layered over the shared
/// backend. Writes reach the backend only when the session commits, so a
/// rolled-back request never invalidates or populates shared entries.
#[derive(Clone)]
pub struct CacheSession {
    backend: Arc<dyn Cache>,
    state: Arc<Mutex<SessionState>>,
}

impl CacheSession {
    /// Opens a session over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn Cache>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Returns the number of writes waiting for commit.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.state.lock().map(|guard| guard.staged.len()).unwrap_or(0)
    }

    fn open_state(&self) -> CacheResult<MutexGuard<'_, SessionState>> {
        let guard = self
            .state
            .lock()
            .map_err(|err| CacheError::backend(std::io::Error::other(err.to_string())))?;
        if guard.finished {
            return Err(CacheError::SessionClosed);
        }
        Ok(guard)
    }

    fn stage(&self, op: StagedOp) -> CacheResult<()> {
        self.open_state()?.staged.push(op);
        Ok(())
    }

    fn finish(&self) -> TransactionResult<Vec<StagedOp>> {
        let mut guard = self
            .state
            .lock()
            .map_err(|err| TransactionError::commit(LABEL, std::io::Error::other(err.to_string())))?;
        if guard.finished {
            return Err(TransactionError::AlreadyFinished(LABEL));
        }
        guard.finished = true;
        Ok(std::mem::take(&mut guard.staged))
    }
}

#[async_trait]
impl Cache for CacheSession {
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()> {
        self.stage(StagedOp::Set {
            key: key.to_owned(),
            value,
            ttl,
        })
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let overlay = {
            let state = self.open_state()?;
            state.staged.iter().rev().find_map(|op| op.effect_on(key))
        };
        match overlay {
            Some(value) => Ok(value),
            None => self.backend.get(key).await,
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.stage(StagedOp::Delete(key.to_owned()))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> CacheResult<()> {
        self.stage(StagedOp::DeleteByPrefix(prefix.to_owned()))
    }
}

#[async_trait]
impl Committer for CacheSession {
    fn label(&self) -> &'static str {
        LABEL
    }

    async fn commit(&self) -> TransactionResult<()> {
        let staged = self.finish()?;
        for op in staged {
            let applied = match op {
                StagedOp::Set { key, value, ttl } => self.backend.set(&key, value, ttl).await,
                StagedOp::Delete(key) => self.backend.delete(&key).await,
                StagedOp::DeleteByPrefix(prefix) => self.backend.delete_by_prefix(&prefix).await,
            };
            applied.map_err(|err| TransactionError::commit(LABEL, err))?;
        }
        Ok(())
    }

    async fn rollback(&self) -> TransactionResult<()> {
        self.finish().map(drop)
    }
}
