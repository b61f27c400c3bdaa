//! In-memory store and its read-committed sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::tables::{StagedTables, WorkspaceTables};
use crate::transaction::{Committer, TransactionError, TransactionResult};
use crate::workspace::domain::{BoardId, Role, RoleKind};
use crate::workspace::ports::{
    WorkspaceRepositoryError, WorkspaceRepositoryResult, WorkspaceStore,
};

const LABEL: &str = "store";

/// Thread-safe in-memory workspace store.
///
/// Sessions stage their writes privately and publish them on commit, so
/// other sessions only ever observe committed rows. Role rows are seeded on
/// construction.
#[derive(Debug, Clone)]
pub struct InMemoryWorkspaceStore {
    committed: Arc<RwLock<WorkspaceTables>>,
    ordering_locks: Arc<Mutex<HashMap<BoardId, Arc<AsyncMutex<()>>>>>,
    writes: Arc<AtomicUsize>,
}

impl Default for InMemoryWorkspaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorkspaceStore {
    /// Creates an empty store with the four role rows seeded.
    #[must_use]
    pub fn new() -> Self {
        let mut tables = WorkspaceTables::default();
        for kind in RoleKind::ALL {
            let role = Role::new(kind);
            tables.roles.insert(role.id(), role);
        }
        Self {
            committed: Arc::new(RwLock::new(tables)),
            ordering_locks: Arc::new(Mutex::new(HashMap::new())),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of mutating repository calls issued so far,
    /// whether or not they were later committed.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn ordering_lock(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Arc<AsyncMutex<()>>> {
        let mut locks = self.ordering_locks.lock().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(Arc::clone(locks.entry(board_id).or_default()))
    }
}

#[async_trait]
impl WorkspaceStore for InMemoryWorkspaceStore {
    type Session = InMemoryWorkspaceSession;

    async fn begin(&self) -> WorkspaceRepositoryResult<Self::Session> {
        Ok(InMemoryWorkspaceSession {
            store: self.clone(),
            state: Arc::new(Mutex::new(SessionState {
                open: true,
                staged: StagedTables::default(),
                ordering_guards: HashMap::new(),
            })),
        })
    }
}

struct SessionState {
    open: bool,
    staged: StagedTables,
    ordering_guards: HashMap<BoardId, OwnedMutexGuard<()>>,
}

/// One unit of work against an [`InMemoryWorkspaceStore`].
///
/// Dropping the last clone of an open session discards its staged writes
/// and releases its ordering locks.
#[derive(Clone)]
pub struct InMemoryWorkspaceSession {
    store: InMemoryWorkspaceStore,
    state: Arc<Mutex<SessionState>>,
}

impl InMemoryWorkspaceSession {
    /// Runs `read` against the merged view of staged and committed rows.
    pub(super) fn read<T>(
        &self,
        read: impl FnOnce(&StagedTables, &WorkspaceTables) -> T,
    ) -> WorkspaceRepositoryResult<T> {
        let state = self.state.lock().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.open {
            return Err(WorkspaceRepositoryError::SessionClosed);
        }
        let committed = self.store.committed.read().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(read(&state.staged, &committed))
    }

    /// Runs `write` with mutable access to the staged rows.
    pub(super) fn write<T>(
        &self,
        write: impl FnOnce(&mut StagedTables, &WorkspaceTables) -> WorkspaceRepositoryResult<T>,
    ) -> WorkspaceRepositoryResult<T> {
        let mut state = self.state.lock().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.open {
            return Err(WorkspaceRepositoryError::SessionClosed);
        }
        let committed = self.store.committed.read().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        self.store.writes.fetch_add(1, Ordering::SeqCst);
        write(&mut state.staged, &committed)
    }

    fn holds_ordering_lock(&self, board_id: BoardId) -> WorkspaceRepositoryResult<bool> {
        let state = self.state.lock().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.open {
            return Err(WorkspaceRepositoryError::SessionClosed);
        }
        Ok(state.ordering_guards.contains_key(&board_id))
    }

    /// Waits for the board's ordering lock and keeps it until the session
    /// finishes.
    pub(super) async fn acquire_ordering_lock(
        &self,
        board_id: BoardId,
    ) -> WorkspaceRepositoryResult<()> {
        if self.holds_ordering_lock(board_id)? {
            return Ok(());
        }
        let guard = self.store.ordering_lock(board_id)?.lock_owned().await;
        let mut state = self.state.lock().map_err(|err| {
            WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if !state.open {
            return Err(WorkspaceRepositoryError::SessionClosed);
        }
        state.ordering_guards.insert(board_id, guard);
        Ok(())
    }

    fn finish(&self) -> TransactionResult<SessionState> {
        let mut state = self.state.lock().map_err(|err| {
            TransactionError::commit(
                LABEL,
                WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string())),
            )
        })?;
        if !state.open {
            return Err(TransactionError::AlreadyFinished(LABEL));
        }
        state.open = false;
        Ok(SessionState {
            open: false,
            staged: std::mem::take(&mut state.staged),
            ordering_guards: std::mem::take(&mut state.ordering_guards),
        })
    }
}

#[async_trait]
impl Committer for InMemoryWorkspaceSession {
    fn label(&self) -> &'static str {
        LABEL
    }

    async fn commit(&self) -> TransactionResult<()> {
        let finished = self.finish()?;
        let mut committed = self.store.committed.write().map_err(|err| {
            TransactionError::commit(
                LABEL,
                WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string())),
            )
        })?;
        if let Some(member) = finished.staged.conflicting_member(&committed) {
            return Err(TransactionError::commit(
                LABEL,
                WorkspaceRepositoryError::DuplicateMembership {
                    board_id: member.board_id(),
                    user_id: member.user_id(),
                },
            ));
        }
        finished.staged.apply(&mut committed);
        drop(committed);
        drop(finished.ordering_guards);
        Ok(())
    }

    async fn rollback(&self) -> TransactionResult<()> {
        self.finish().map(drop)
    }
}
