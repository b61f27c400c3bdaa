//! Shared test helpers for in-memory workspace integration tests.

use std::future::Future;
use std::sync::Arc;

use corkboard::app::Workspace;
use corkboard::config::AppConfig;
use corkboard::notification::RecordingNotifier;
use corkboard::transaction::{HandlerOutcome, RequestScope};
use corkboard::workspace::adapters::memory::{InMemoryWorkspaceSession, InMemoryWorkspaceStore};
use corkboard::workspace::domain::{User, UserId};
use corkboard::workspace::services::WorkspaceResult;
use rstest::fixture;

/// Request scope handed to in-memory handlers.
pub type Scope = RequestScope<InMemoryWorkspaceSession>;

/// Workspace wired over the in-memory store with a recording notifier.
pub struct TestWorkspace {
    /// Composition root under test.
    pub workspace: Workspace<InMemoryWorkspaceStore>,
    /// Notifications dispatched after commit.
    pub notifier: RecordingNotifier,
}

/// Provides a fresh in-memory workspace for each test.
#[fixture]
pub fn app() -> TestWorkspace {
    let notifier = RecordingNotifier::new();
    let workspace = Workspace::in_memory(&AppConfig::default(), Arc::new(notifier.clone()));
    TestWorkspace {
        workspace,
        notifier,
    }
}

impl TestWorkspace {
    /// Runs `handler` as one committed request.
    ///
    /// # Errors
    ///
    /// Returns the handler's error after the request rolls back.
    pub async fn request<T, F, Fut>(&self, actor: UserId, handler: F) -> WorkspaceResult<T>
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

    /// Registers a user named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    pub async fn register(&self, name: &str) -> WorkspaceResult<User> {
        let users = self.workspace.users();
        let email = format!("{name}@example.com");
        self.request(UserId::new(), |scope| async move {
            users.register(&scope, name, &email).await
        })
        .await
    }
}
