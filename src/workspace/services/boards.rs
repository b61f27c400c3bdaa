//! Board lifecycle service.

use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

use super::access::{AccessGuard, BoardOperation};
use super::columns::board_cache_prefix;
use super::{WorkspaceError, WorkspaceResult};
use crate::cache::Cache;
use crate::transaction::RequestScope;
use crate::workspace::domain::{Board, BoardId, BoardMember, BoardName, RoleKind};
use crate::workspace::ports::WorkspaceSession;

/// Requested board changes. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New privacy flag.
    pub is_private: Option<bool>,
}

/// Creates, reads, updates, and deletes boards.
#[derive(Clone)]
pub struct BoardService<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> BoardService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new board service.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Creates a board owned by the acting user, who becomes its owner
    /// member.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UserNotFound`] when the actor is not a
    /// stored user and [`WorkspaceError::Domain`] for invalid names.
    pub async fn create_board<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        name: &str,
        is_private: bool,
    ) -> WorkspaceResult<Board> {
        let board_name = BoardName::new(name)?;
        let store = scope.store();
        let owner = scope.actor();
        store
            .find_user(owner)
            .await?
            .ok_or(WorkspaceError::UserNotFound(owner))?;
        let owner_role = store
            .find_role_by_kind(RoleKind::Owner)
            .await?
            .ok_or_else(|| WorkspaceError::RoleNotFound(RoleKind::Owner.to_string()))?;

        let board = Board::new(owner, board_name, is_private, &*self.clock);
        store.insert_board(&board).await?;
        let member = BoardMember::new(board.id(), owner, owner_role.id(), &*self.clock);
        store.insert_member(&member).await?;

        debug!(board_id = %board.id(), %owner, "board created");
        Ok(board)
    }

    /// Returns a board the actor may read.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards and
    /// access errors for private boards the actor cannot view.
    pub async fn get_board<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
    ) -> WorkspaceResult<Board> {
        AccessGuard::readable_board(scope.store(), scope.actor(), board_id).await
    }

    /// Returns every board the actor belongs to, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Repository`] when the lookup fails.
    pub async fn list_boards_for_user<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
    ) -> WorkspaceResult<Vec<Board>> {
        Ok(scope.store().list_boards_for_user(scope.actor()).await?)
    }

    /// Renames a board or changes its privacy.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards and
    /// access errors when the actor is not at least a maintainer.
    pub async fn update_board<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
        update: BoardUpdate,
    ) -> WorkspaceResult<Board> {
        let store = scope.store();
        let mut board = store
            .find_board(board_id)
            .await?
            .ok_or(WorkspaceError::BoardNotFound(board_id))?;
        AccessGuard::authorize(store, BoardOperation::UpdateBoard, scope.actor(), board_id)
            .await?;

        if let Some(name) = update.name {
            board.rename(BoardName::new(name)?, &*self.clock);
        }
        if let Some(is_private) = update.is_private {
            board.set_private(is_private, &*self.clock);
        }
        store.update_board(&board).await?;
        scope
            .cache()
            .delete_by_prefix(&board_cache_prefix(board_id))
            .await?;

        debug!(%board_id, "board updated");
        Ok(board)
    }

    /// Deletes a board with its columns, members, tasks, and dependency
    /// edges.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards and
    /// access errors when the actor is not the owner.
    pub async fn delete_board<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
    ) -> WorkspaceResult<()> {
        let store = scope.store();
        store
            .find_board(board_id)
            .await?
            .ok_or(WorkspaceError::BoardNotFound(board_id))?;
        AccessGuard::authorize(store, BoardOperation::DeleteBoard, scope.actor(), board_id)
            .await?;
        store.lock_board(board_id).await?;

        store.delete_board(board_id).await?;
        scope
            .cache()
            .delete_by_prefix(&board_cache_prefix(board_id))
            .await?;

        debug!(%board_id, "board deleted");
        Ok(())
    }
}
