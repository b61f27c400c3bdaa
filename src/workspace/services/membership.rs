//! Board membership management.

use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

use super::access::{AccessGuard, BoardOperation};
use super::{WorkspaceError, WorkspaceResult};
use crate::notification::Notification;
use crate::transaction::RequestScope;
use crate::workspace::domain::{Board, BoardId, BoardMember, Role, RoleKind, UserId};
use crate::workspace::ports::{WorkspaceRepositoryError, WorkspaceSession};

/// Invites, re-roles, and removes board members.
///
/// Actors need at least [`RoleKind::Maintainer`].
#[derive(Clone)]
pub struct MembershipService<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> MembershipService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new membership service.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Adds `user_id` to the board with the named role.
    ///
    /// The invitee receives an in-app notification once the request commits.
    /// The board's lock is held until then, so concurrent invitations of one
    /// user are applied one after another.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`],
    /// [`WorkspaceError::UserNotFound`], or [`WorkspaceError::RoleNotFound`]
    /// for unknown references, [`WorkspaceError::AlreadyMember`] when the
    /// user already belongs to the board, and access errors for actors
    /// below maintainer.
    pub async fn invite_user<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
        user_id: UserId,
        role_name: &str,
    ) -> WorkspaceResult<BoardMember> {
        let store = scope.store();
        let board = find_board(store, board_id).await?;
        AccessGuard::authorize(store, BoardOperation::ManageMembers, scope.actor(), board_id)
            .await?;
        store
            .find_user(user_id)
            .await?
            .ok_or(WorkspaceError::UserNotFound(user_id))?;
        store.lock_board(board_id).await?;
        if store.find_member(board_id, user_id).await?.is_some() {
            return Err(WorkspaceError::AlreadyMember { board_id, user_id });
        }
        let role = resolve_role(store, role_name).await?;

        let member = BoardMember::new(board_id, user_id, role.id(), &*self.clock);
        store
            .insert_member(&member)
            .await
            .map_err(|err| match err {
                WorkspaceRepositoryError::DuplicateMembership { .. } => {
                    WorkspaceError::AlreadyMember { board_id, user_id }
                }
                other => WorkspaceError::Repository(other),
            })?;

        scope.defer_notification(Notification::in_app(
            user_id,
            "Board invitation",
            format!("You were added to {} as {}.", board.name(), role.kind()),
        ));
        debug!(%board_id, %user_id, role = %role.kind(), "member invited");
        Ok(member)
    }

    /// Removes `user_id` from the board.
    ///
    /// The removed user receives an email notification once the request
    /// commits.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`],
    /// [`WorkspaceError::UserNotFound`], or
    /// [`WorkspaceError::MembershipNotFound`] for unknown references, and
    /// access errors for actors below maintainer.
    pub async fn remove_user<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
        user_id: UserId,
    ) -> WorkspaceResult<()> {
        let store = scope.store();
        let board = find_board(store, board_id).await?;
        AccessGuard::authorize(store, BoardOperation::ManageMembers, scope.actor(), board_id)
            .await?;
        store
            .find_user(user_id)
            .await?
            .ok_or(WorkspaceError::UserNotFound(user_id))?;
        let member = find_membership(store, board_id, user_id).await?;

        store.delete_member(member.id()).await?;

        scope.defer_notification(Notification::email(
            user_id,
            "Removed from board",
            format!("You no longer have access to {}.", board.name()),
        ));
        debug!(%board_id, %user_id, "member removed");
        Ok(())
    }

    /// Changes the role of an existing member in place.
    ///
    /// The membership keeps its identifier. The member receives an in-app
    /// notification once the request commits.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`],
    /// [`WorkspaceError::MembershipNotFound`], or
    /// [`WorkspaceError::RoleNotFound`] for unknown references, and access
    /// errors for actors below maintainer.
    pub async fn change_user_role<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
        user_id: UserId,
        role_name: &str,
    ) -> WorkspaceResult<BoardMember> {
        let store = scope.store();
        let board = find_board(store, board_id).await?;
        AccessGuard::authorize(store, BoardOperation::ManageMembers, scope.actor(), board_id)
            .await?;
        let mut member = find_membership(store, board_id, user_id).await?;
        let role = resolve_role(store, role_name).await?;

        member.change_role(role.id());
        store.update_member(&member).await?;

        scope.defer_notification(Notification::in_app(
            user_id,
            "Board role changed",
            format!("Your role on {} is now {}.", board.name(), role.kind()),
        ));
        debug!(%board_id, %user_id, role = %role.kind(), "member role changed");
        Ok(member)
    }

    /// Lists the board's members with their roles, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::BoardNotFound`] for unknown boards and
    /// access errors for private boards the actor cannot view.
    pub async fn list_members<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        board_id: BoardId,
    ) -> WorkspaceResult<Vec<(BoardMember, RoleKind)>> {
        let store = scope.store();
        AccessGuard::readable_board(store, scope.actor(), board_id).await?;
        let members = store.list_members(board_id).await?;
        let mut listed = Vec::with_capacity(members.len());
        for member in members {
            let role = member_role(store, &member).await?;
            listed.push((member, role.kind()));
        }
        Ok(listed)
    }
}

async fn find_board<S: WorkspaceSession>(store: &S, board_id: BoardId) -> WorkspaceResult<Board> {
    store
        .find_board(board_id)
        .await?
        .ok_or(WorkspaceError::BoardNotFound(board_id))
}

async fn find_membership<S: WorkspaceSession>(
    store: &S,
    board_id: BoardId,
    user_id: UserId,
) -> WorkspaceResult<BoardMember> {
    store
        .find_member(board_id, user_id)
        .await?
        .ok_or(WorkspaceError::MembershipNotFound { board_id, user_id })
}

async fn member_role<S: WorkspaceSession>(store: &S, member: &BoardMember) -> WorkspaceResult<Role> {
    store
        .find_role(member.role_id())
        .await?
        .ok_or_else(|| WorkspaceError::RoleNotFound(member.role_id().to_string()))
}

/// Resolves a role by exact canonical name.
async fn resolve_role<S: WorkspaceSession>(store: &S, role_name: &str) -> WorkspaceResult<Role> {
    let kind = RoleKind::try_from(role_name)
        .map_err(|_| WorkspaceError::RoleNotFound(role_name.to_owned()))?;
    store
        .find_role_by_kind(kind)
        .await?
        .ok_or_else(|| WorkspaceError::RoleNotFound(role_name.to_owned()))
}
