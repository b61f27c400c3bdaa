//! Shared harness for workspace service tests.

use std::future::Future;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;

use crate::app::{Workspace, WorkspaceParts};
use crate::cache::InMemoryCache;
use crate::config::AppConfig;
use crate::notification::RecordingNotifier;
use crate::transaction::{HandlerOutcome, RequestScope};
use crate::workspace::adapters::memory::{InMemoryWorkspaceSession, InMemoryWorkspaceStore};
use crate::workspace::domain::{Board, BoardId, Column, User, UserId};
use crate::workspace::services::{BoardUpdate, WorkspaceResult};

pub(super) type Scope = RequestScope<InMemoryWorkspaceSession>;

pub(super) struct Harness {
    pub(super) store: Arc<InMemoryWorkspaceStore>,
    pub(super) cache: Arc<InMemoryCache>,
    pub(super) notifier: RecordingNotifier,
    pub(super) workspace: Workspace<InMemoryWorkspaceStore>,
}

#[fixture]
pub(super) fn harness() -> Harness {
    let store = Arc::new(InMemoryWorkspaceStore::new());
    let cache = Arc::new(InMemoryCache::new());
    let notifier = RecordingNotifier::new();
    let workspace = Workspace::new(
        WorkspaceParts {
            store: Arc::clone(&store),
            cache: cache.clone(),
            notifier: Arc::new(notifier.clone()),
            clock: Arc::new(DefaultClock),
        },
        &AppConfig::default(),
    );
    Harness {
        store,
        cache,
        notifier,
        workspace,
    }
}

impl Harness {
    /// Runs `handler` in its own unit of work, committing on `Ok`.
    pub(super) async fn run<T, F, Fut>(&self, actor: UserId, handler: F) -> WorkspaceResult<T>
    where
        F: FnOnce(Scope) -> Fut,
        Fut: Future<Output = WorkspaceResult<T>>,
    {
        self.workspace
            .coordinator()
            .run(actor, |scope| async move {
                handler(scope).await.map(HandlerOutcome::Success)
            })
            .await
    }

    pub(super) async fn register(&self, name: &str) -> User {
        let users = self.workspace.users();
        let email = format!("{name}@example.com");
        self.run(UserId::new(), |scope| async move {
            users.register(&scope, name, &email).await
        })
        .await
        .expect("register user")
    }

    pub(super) async fn board(&self, owner: UserId, name: &str, is_private: bool) -> Board {
        let boards = self.workspace.boards();
        self.run(owner, |scope| async move {
            boards.create_board(&scope, name, is_private).await
        })
        .await
        .expect("create board")
    }

    pub(super) async fn columns(&self, actor: UserId, board_id: BoardId, names: &[&str]) -> Vec<Column> {
        let service = self.workspace.columns();
        let mut created = Vec::with_capacity(names.len());
        for name in names {
            let column = self
                .run(actor, |scope| async move {
                    service.create_column(&scope, board_id, name).await
                })
                .await
                .expect("create column");
            created.push(column);
        }
        created
    }

    pub(super) async fn invite(&self, actor: UserId, board_id: BoardId, user_id: UserId, role: &str) {
        let membership = self.workspace.membership();
        self.run(actor, |scope| async move {
            membership.invite_user(&scope, board_id, user_id, role).await
        })
        .await
        .expect("invite member");
    }

    /// Returns `(name, position)` pairs in display order.
    pub(super) async fn layout(&self, actor: UserId, board_id: BoardId) -> Vec<(String, u32)> {
        let service = self.workspace.columns();
        self.run(actor, |scope| async move {
            service.list_columns(&scope, board_id).await
        })
        .await
        .expect("list columns")
        .into_iter()
        .map(|column| (column.name().to_string(), column.position().value()))
        .collect()
    }

    pub(super) async fn make_private(&self, owner: UserId, board_id: BoardId) {
        let boards = self.workspace.boards();
        self.run(owner, |scope| async move {
            boards
                .update_board(
                    &scope,
                    board_id,
                    BoardUpdate {
                        name: None,
                        is_private: Some(true),
                    },
                )
                .await
        })
        .await
        .expect("make board private");
    }
}

/// A board with an owner and members of every other role.
pub(super) struct Team {
    pub(super) owner: User,
    pub(super) maintainer: User,
    pub(super) editor: User,
    pub(super) viewer: User,
    pub(super) outsider: User,
    pub(super) board: Board,
}

pub(super) async fn team(harness: &Harness) -> Team {
    let owner = harness.register("owner").await;
    let maintainer = harness.register("maintainer").await;
    let editor = harness.register("editor").await;
    let viewer = harness.register("viewer").await;
    let outsider = harness.register("outsider").await;
    let board = harness.board(owner.id(), "Roadmap", false).await;
    harness
        .invite(owner.id(), board.id(), maintainer.id(), "maintainer")
        .await;
    harness.invite(owner.id(), board.id(), editor.id(), "editor").await;
    harness.invite(owner.id(), board.id(), viewer.id(), "viewer").await;
    Team {
        owner,
        maintainer,
        editor,
        viewer,
        outsider,
        board,
    }
}
