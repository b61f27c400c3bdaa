//! Role-weighted access checks for board operations.

use tracing::debug;

use super::{WorkspaceError, WorkspaceResult};
use crate::workspace::domain::{Board, BoardId, RoleKind, UserId};
use crate::workspace::ports::{BoardRepository, MembershipRepository, RoleRepository};

/// Board operations and the role each one requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardOperation {
    /// Read the board, its columns, members, and tasks.
    ViewBoard,
    /// Rename the board or change its privacy.
    UpdateBoard,
    /// Delete the board.
    DeleteBoard,
    /// Create, reorder, rename, finalize, or delete columns.
    ManageColumns,
    /// Invite, remove, or re-role members.
    ManageMembers,
    /// Create, move, or delete tasks and dependency edges.
    EditTasks,
}

impl BoardOperation {
    /// Returns the weakest role allowed to perform the operation.
    #[must_use]
    pub const fn required_role(self) -> RoleKind {
        match self {
            Self::ViewBoard => RoleKind::Viewer,
            Self::DeleteBoard => RoleKind::Owner,
            Self::UpdateBoard | Self::ManageColumns | Self::ManageMembers => RoleKind::Maintainer,
            Self::EditTasks => RoleKind::Editor,
        }
    }
}

/// Stateless guard resolving a user's board role.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard;

impl AccessGuard {
    /// Admits `user_id` iff their role on `board_id` weighs at most
    /// `required`.
    ///
    /// Returns the user's role on success.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotMember`] without a membership row,
    /// [`WorkspaceError::Forbidden`] when the role is too weak, and
    /// [`WorkspaceError::RoleNotFound`] when the membership references a
    /// missing role row.
    pub async fn require_access<S>(
        session: &S,
        required: RoleKind,
        user_id: UserId,
        board_id: BoardId,
    ) -> WorkspaceResult<RoleKind>
    where
        S: MembershipRepository + RoleRepository + ?Sized,
    {
        let member = session
            .find_member(board_id, user_id)
            .await?
            .ok_or(WorkspaceError::NotMember { board_id, user_id })?;
        let role = session
            .find_role(member.role_id())
            .await?
            .ok_or_else(|| WorkspaceError::RoleNotFound(member.role_id().to_string()))?;

        let actual = role.kind();
        if actual.satisfies(required) {
            Ok(actual)
        } else {
            debug!(%board_id, %user_id, %required, %actual, "access denied");
            Err(WorkspaceError::Forbidden {
                board_id,
                required,
                actual,
            })
        }
    }

    /// Checks access for a named board operation.
    ///
    /// # Errors
    ///
    /// See [`AccessGuard::require_access`].
    pub async fn authorize<S>(
        session: &S,
        operation: BoardOperation,
        user_id: UserId,
        board_id: BoardId,
    ) -> WorkspaceResult<RoleKind>
    where
        S: MembershipRepository + RoleRepository + ?Sized,
    {
        Self::require_access(session, operation.required_role(), user_id, board_id).await
    }

    /// Loads a board the user may read.
    ///
    /// Public boards are readable by anyone; private boards require at
    /// least [`RoleKind::Viewer`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards and the
    /// [`AccessGuard::require_access`] errors for private boards.
    pub async fn readable_board<S>(
        session: &S,
        user_id: UserId,
        board_id: BoardId,
    ) -> WorkspaceResult<Board>
    where
        S: BoardRepository + MembershipRepository + RoleRepository + ?Sized,
    {
        let board = session
            .find_board(board_id)
            .await?
            .ok_or(WorkspaceError::BoardNotFound(board_id))?;
        if board.is_private() {
            Self::authorize(session, BoardOperation::ViewBoard, user_id, board_id).await?;
        }
        Ok(board)
    }
}
