//! Shared world state for column ordering BDD scenarios.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use corkboard::app::Workspace;
use corkboard::config::AppConfig;
use corkboard::notification::TracingNotifier;
use corkboard::transaction::{HandlerOutcome, RequestScope};
use corkboard::workspace::adapters::memory::{InMemoryWorkspaceSession, InMemoryWorkspaceStore};
use corkboard::workspace::domain::{BoardId, Column, ColumnId, UserId};
use corkboard::workspace::services::{MoveOutcome, WorkspaceError, WorkspaceResult};
use rstest::fixture;

/// Scenario world for column ordering behaviour tests.
pub struct ColumnWorld {
    pub workspace: Workspace<InMemoryWorkspaceStore>,
    pub users: HashMap<String, UserId>,
    pub owner_id: Option<UserId>,
    pub board_id: Option<BoardId>,
    pub columns: HashMap<String, ColumnId>,
    pub writes_before_move: usize,
    pub last_move: Option<Result<MoveOutcome, WorkspaceError>>,
}

impl ColumnWorld {
    /// Creates a world over a fresh in-memory workspace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workspace: Workspace::in_memory(&AppConfig::default(), Arc::new(TracingNotifier)),
            users: HashMap::new(),
            owner_id: None,
            board_id: None,
            columns: HashMap::new(),
            writes_before_move: 0,
            last_move: None,
        }
    }

    /// Runs `handler` as one committed request.
    pub fn request<T, F, Fut>(&self, actor: UserId, handler: F) -> WorkspaceResult<T>
    where
        F: FnOnce(RequestScope<InMemoryWorkspaceSession>) -> Fut,
        Fut: Future<Output = WorkspaceResult<T>>,
    {
        run_async(self.workspace.coordinator().run(actor, |scope| async move {
            handler(scope).await.map(HandlerOutcome::Success)
        }))
    }

    /// Returns the user called `name`, registering them on first use.
    pub fn user(&mut self, name: &str) -> Result<UserId, eyre::Report> {
        if let Some(id) = self.users.get(name) {
            return Ok(*id);
        }
        let users = self.workspace.users();
        let email = format!("{name}@example.com");
        let user = self.request(UserId::new(), |scope| async move {
            users.register(&scope, name, &email).await
        })?;
        self.users.insert(name.to_owned(), user.id());
        Ok(user.id())
    }

    /// Returns the scenario board.
    pub fn board_id(&self) -> Result<BoardId, eyre::Report> {
        self.board_id
            .ok_or_else(|| eyre::eyre!("missing board in scenario world"))
    }

    /// Returns the column called `name`.
    pub fn column_id(&self, name: &str) -> Result<ColumnId, eyre::Report> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown column {name:?}"))
    }

    /// Returns the board's columns in display order, read as `actor`.
    pub fn listed_columns(&self, actor: UserId) -> Result<Vec<Column>, eyre::Report> {
        let board_id = self.board_id()?;
        let service = self.workspace.columns();
        Ok(self.request(actor, |scope| async move {
            service.list_columns(&scope, board_id).await
        })?)
    }

    /// Returns the number of row writes staged so far.
    pub fn write_count(&self) -> usize {
        self.workspace.coordinator().store().write_count()
    }
}

impl Default for ColumnWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ColumnWorld {
    ColumnWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
