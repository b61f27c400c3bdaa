//! Board membership linking a user to a board with a role.

use super::{BoardId, MemberId, RoleId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Membership of a user on a board.
///
/// At most one membership exists per (board, user) pair. Changing the role
/// updates the row in place; the member identifier never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMember {
    id: MemberId,
    board_id: BoardId,
    user_id: UserId,
    role_id: RoleId,
    joined_at: DateTime<Utc>,
}

impl BoardMember {
    /// Creates a new membership.
    #[must_use]
    pub fn new(board_id: BoardId, user_id: UserId, role_id: RoleId, clock: &impl Clock) -> Self {
        Self {
            id: MemberId::new(),
            board_id,
            user_id,
            role_id,
            joined_at: clock.utc(),
        }
    }

    /// Reconstructs a membership from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: MemberId,
        board_id: BoardId,
        user_id: UserId,
        role_id: RoleId,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            board_id,
            user_id,
            role_id,
            joined_at,
        }
    }

    /// Returns the membership identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the member user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the referenced role row.
    #[must_use]
    pub const fn role_id(&self) -> RoleId {
        self.role_id
    }

    /// Returns when the user joined the board.
    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Points the membership at a different role.
    pub const fn change_role(&mut self, role_id: RoleId) {
        self.role_id = role_id;
    }
}
