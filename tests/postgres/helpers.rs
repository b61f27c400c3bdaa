//! Shared test helpers for `PostgreSQL` integration tests.

use std::env;
use std::future::Future;
use std::sync::Arc;

use corkboard::app::{Workspace, WorkspaceParts};
use corkboard::cache::InMemoryCache;
use corkboard::config::AppConfig;
use corkboard::notification::RecordingNotifier;
use corkboard::transaction::{HandlerOutcome, RequestScope};
use corkboard::workspace::adapters::postgres::{PostgresWorkspaceSession, PostgresWorkspaceStore};
use corkboard::workspace::domain::{User, UserId};
use corkboard::workspace::services::WorkspaceResult;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use uuid::Uuid;

/// Boxed error used by provisioning helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Variable naming the database used by these tests.
pub const TEST_DATABASE_URL_VAR: &str = "CORKBOARD_TEST_DATABASE_URL";

/// SQL creating the workspace tables.
pub const CREATE_WORKSPACE_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_workspace_tables/up.sql");

/// A migrated schema private to one test, dropped with the value.
pub struct TestSchema {
    database_url: String,
    name: String,
    /// Workspace wired over a pool whose `search_path` is the schema.
    pub workspace: Workspace<PostgresWorkspaceStore>,
    /// Notifications dispatched after commit.
    pub notifier: RecordingNotifier,
}

impl TestSchema {
    /// Provisions a fresh schema, or returns `None` when no test database
    /// is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created or migrated.
    pub fn provision() -> Result<Option<Self>, BoxError> {
        let Ok(database_url) = env::var(TEST_DATABASE_URL_VAR) else {
            return Ok(None);
        };
        let name = format!("corkboard_test_{}", Uuid::new_v4().simple());
        tokio::task::block_in_place(|| Self::create(database_url, name)).map(Some)
    }

    fn create(database_url: String, name: String) -> Result<Self, BoxError> {
        let mut conn = PgConnection::establish(&database_url)?;
        conn.batch_execute(&format!("CREATE SCHEMA {name}; SET search_path TO {name};"))?;
        conn.batch_execute(CREATE_WORKSPACE_SQL)?;

        let separator = if database_url.contains('?') { '&' } else { '?' };
        let scoped_url = format!("{database_url}{separator}options=-csearch_path%3D{name}");
        let store = PostgresWorkspaceStore::connect(&scoped_url, 4)?;
        let notifier = RecordingNotifier::new();
        let workspace = Workspace::new(
            WorkspaceParts {
                store: Arc::new(store),
                cache: Arc::new(InMemoryCache::new()),
                notifier: Arc::new(notifier.clone()),
                clock: Arc::new(DefaultClock),
            },
            &AppConfig::default(),
        );
        Ok(Self {
            database_url,
            name,
            workspace,
            notifier,
        })
    }

    /// Runs `handler` as one committed request.
    ///
    /// # Errors
    ///
    /// Returns the handler's error after the request rolls back.
    pub async fn request<T, F, Fut>(&self, actor: UserId, handler: F) -> WorkspaceResult<T>
    where
        F: FnOnce(RequestScope<PostgresWorkspaceSession>) -> Fut,
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

impl Drop for TestSchema {
    fn drop(&mut self) {
        let drop_schema = format!("DROP SCHEMA IF EXISTS {} CASCADE;", self.name);
        if let Ok(mut conn) = PgConnection::establish(&self.database_url) {
            // Best effort; a leftover schema only costs disk space.
            let _dropped = conn.batch_execute(&drop_schema);
        }
    }
}
