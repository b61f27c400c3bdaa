//! `PostgreSQL` store opening one database transaction per session.

use async_trait::async_trait;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use std::sync::{Arc, Mutex};

use crate::transaction::{Committer, TransactionError, TransactionResult};
use crate::workspace::ports::{
    WorkspaceRepositoryError, WorkspaceRepositoryResult, WorkspaceStore,
};

const LABEL: &str = "store";

/// `PostgreSQL` connection pool type used by workspace adapters.
pub type WorkspacePgPool = Pool<ConnectionManager<PgConnection>>;

type PooledPgConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed workspace store.
#[derive(Debug, Clone)]
pub struct PostgresWorkspaceStore {
    pool: WorkspacePgPool,
}

impl PostgresWorkspaceStore {
    /// Creates a store from an existing connection pool.
    #[must_use]
    pub const fn new(pool: WorkspacePgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `database_url` with at most `pool_size`
    /// connections.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::Persistence`] when the pool
    /// cannot be built.
    pub fn connect(database_url: &str, pool_size: u32) -> WorkspaceRepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(WorkspaceRepositoryError::persistence)?;
        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &WorkspacePgPool {
        &self.pool
    }
}

#[async_trait]
impl WorkspaceStore for PostgresWorkspaceStore {
    type Session = PostgresWorkspaceSession;

    async fn begin(&self) -> WorkspaceRepositoryResult<Self::Session> {
        let pool = self.pool.clone();
        let connection = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WorkspaceRepositoryError::persistence)?;
            AnsiTransactionManager::begin_transaction(&mut *connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok::<_, WorkspaceRepositoryError>(connection)
        })
        .await
        .map_err(WorkspaceRepositoryError::persistence)??;

        Ok(PostgresWorkspaceSession {
            connection: Arc::new(Mutex::new(Some(connection))),
        })
    }
}

/// One database transaction shared by every repository call of a request.
///
/// The connection leaves the pool for the lifetime of the session. A
/// session dropped without commit or rollback returns its connection while
/// still inside a transaction; the pool discards such connections, which
/// makes the server roll the transaction back.
#[derive(Clone)]
pub struct PostgresWorkspaceSession {
    connection: Arc<Mutex<Option<PooledPgConnection>>>,
}

impl PostgresWorkspaceSession {
    pub(super) async fn run_blocking<F, T>(&self, f: F) -> WorkspaceRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkspaceRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = slot.lock().map_err(|err| {
                WorkspaceRepositoryError::persistence(std::io::Error::other(err.to_string()))
            })?;
            let connection = guard
                .as_mut()
                .ok_or(WorkspaceRepositoryError::SessionClosed)?;
            f(&mut **connection)
        })
        .await
        .map_err(WorkspaceRepositoryError::persistence)?
    }

    async fn finish<F>(&self, finish: F) -> TransactionResult<()>
    where
        F: FnOnce(&mut PgConnection) -> diesel::QueryResult<()> + Send + 'static,
    {
        let slot = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let taken = slot
                .lock()
                .map_err(|err| {
                    TransactionError::commit(LABEL, std::io::Error::other(err.to_string()))
                })?
                .take();
            let mut connection = taken.ok_or(TransactionError::AlreadyFinished(LABEL))?;
            finish(&mut *connection).map_err(|err| TransactionError::commit(LABEL, err))
        })
        .await
        .map_err(|err| TransactionError::commit(LABEL, err))?
    }
}

#[async_trait]
impl Committer for PostgresWorkspaceSession {
    fn label(&self) -> &'static str {
        LABEL
    }

    async fn commit(&self) -> TransactionResult<()> {
        self.finish(|connection| AnsiTransactionManager::commit_transaction(connection))
            .await
    }

    async fn rollback(&self) -> TransactionResult<()> {
        self.finish(|connection| AnsiTransactionManager::rollback_transaction(connection))
            .await
            .map_err(|err| match err {
                TransactionError::Commit { label, cause } => {
                    TransactionError::Rollback { label, cause }
                }
                other => other,
            })
    }
}
