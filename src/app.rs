//! Composition root wiring stores, cache, notifier, and services.

use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tracing::info;

use crate::cache::{Cache, InMemoryCache};
use crate::config::AppConfig;
use crate::notification::Notifier;
use crate::transaction::TransactionCoordinator;
use crate::workspace::adapters::memory::InMemoryWorkspaceStore;
use crate::workspace::adapters::postgres::PostgresWorkspaceStore;
use crate::workspace::ports::{WorkspaceRepositoryResult, WorkspaceStore};
use crate::workspace::services::{
    BoardService, ColumnService, MembershipService, TaskService, UserService,
};

/// Shared collaborators for a workspace instance.
pub struct WorkspaceParts<S, C> {
    /// Storage backend.
    pub store: Arc<S>,
    /// Cache backend.
    pub cache: Arc<dyn Cache>,
    /// Notification sink.
    pub notifier: Arc<dyn Notifier>,
    /// Time source for timestamps.
    pub clock: Arc<C>,
}

/// A fully wired workspace: one coordinator plus the services handlers use.
///
/// Handlers run through [`Workspace::coordinator`] and call the services
/// with the scope they receive.
pub struct Workspace<S, C = DefaultClock>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    coordinator: TransactionCoordinator<S>,
    users: UserService,
    boards: BoardService<C>,
    columns: ColumnService,
    membership: MembershipService<C>,
    tasks: TaskService<C>,
}

impl<S, C> Workspace<S, C>
where
    S: WorkspaceStore,
    C: Clock + Send + Sync,
{
    /// Wires a workspace from explicit collaborators.
    #[must_use]
    pub fn new(parts: WorkspaceParts<S, C>, config: &AppConfig) -> Self {
        let WorkspaceParts {
            store,
            cache,
            notifier,
            clock,
        } = parts;
        Self {
            coordinator: TransactionCoordinator::new(store, cache, notifier),
            users: UserService::new(),
            boards: BoardService::new(Arc::clone(&clock)),
            columns: ColumnService::new(config.cache_ttl),
            membership: MembershipService::new(Arc::clone(&clock)),
            tasks: TaskService::new(clock),
        }
    }

    /// Returns the transaction coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &TransactionCoordinator<S> {
        &self.coordinator
    }

    /// Returns the user service.
    #[must_use]
    pub const fn users(&self) -> &UserService {
        &self.users
    }

    /// Returns the board service.
    #[must_use]
    pub const fn boards(&self) -> &BoardService<C> {
        &self.boards
    }

    /// Returns the column ordering service.
    #[must_use]
    pub const fn columns(&self) -> &ColumnService {
        &self.columns
    }

    /// Returns the membership service.
    #[must_use]
    pub const fn membership(&self) -> &MembershipService<C> {
        &self.membership
    }

    /// Returns the task service.
    #[must_use]
    pub const fn tasks(&self) -> &TaskService<C> {
        &self.tasks
    }
}

impl Workspace<InMemoryWorkspaceStore> {
    /// Builds a workspace over the in-memory store and cache.
    #[must_use]
    pub fn in_memory(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        info!("using in-memory workspace store");
        Self::new(
            WorkspaceParts {
                store: Arc::new(InMemoryWorkspaceStore::new()),
                cache: Arc::new(InMemoryCache::new()),
                notifier,
                clock: Arc::new(DefaultClock),
            },
            config,
        )
    }
}

impl Workspace<PostgresWorkspaceStore> {
    /// Builds a workspace over a pooled `PostgreSQL` store and the in-memory
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the pool cannot be built.
    pub fn connect(
        database_url: &str,
        config: &AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> WorkspaceRepositoryResult<Self> {
        let store = PostgresWorkspaceStore::connect(database_url, config.db_pool_size)?;
        info!(pool_size = config.db_pool_size, "connected PostgreSQL workspace store");
        Ok(Self::new(
            WorkspaceParts {
                store: Arc::new(store),
                cache: Arc::new(InMemoryCache::new()),
                notifier,
                clock: Arc::new(DefaultClock),
            },
            config,
        ))
    }
}
