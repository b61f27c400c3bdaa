//! Store port opening per-request storage sessions.

use async_trait::async_trait;

use super::repository::{
    BoardRepository, ColumnRepository, MembershipRepository, RoleRepository, TaskRepository,
    UserRepository, WorkspaceRepositoryResult,
};
use crate::transaction::Committer;

/// A storage session: every repository, bound to one unit of work.
///
/// Clones share the same underlying unit of work.
pub trait WorkspaceSession:
    UserRepository
    + RoleRepository
    + BoardRepository
    + ColumnRepository
    + MembershipRepository
    + TaskRepository
    + Committer
    + Clone
    + 'static
{
}

impl<T> WorkspaceSession for T where
    T: UserRepository
        + RoleRepository
        + BoardRepository
        + ColumnRepository
        + MembershipRepository
        + TaskRepository
        + Committer
        + Clone
        + 'static
{
}

/// Shared storage backend that hands out sessions.
#[async_trait]
pub trait WorkspaceStore: Send + Sync + 'static {
    /// Session type handed to request handlers.
    type Session: WorkspaceSession;

    /// Opens a new unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkspaceRepositoryError::Persistence`] when the
    /// backend cannot start a transaction.
    async fn begin(&self) -> WorkspaceRepositoryResult<Self::Session>;
}
