//! Board aggregate.

use super::{BoardId, BoardName, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A board owning ordered columns and role-weighted members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    owner_id: UserId,
    name: BoardName,
    is_private: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBoardData {
    /// Persisted board identifier.
    pub id: BoardId,
    /// Creator and owner of the board.
    pub owner_id: UserId,
    /// Persisted display name.
    pub name: BoardName,
    /// Persisted privacy flag.
    pub is_private: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a new board owned by `owner_id`.
    #[must_use]
    pub fn new(owner_id: UserId, name: BoardName, is_private: bool, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: BoardId::new(),
            owner_id,
            name,
            is_private,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a board from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBoardData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            name: data.name,
            is_private: data.is_private,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &BoardName {
        &self.name
    }

    /// Returns `true` when the board is private.
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.is_private
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the board.
    pub fn rename(&mut self, name: BoardName, clock: &impl Clock) {
        self.name = name;
        self.updated_at = clock.utc();
    }

    /// Changes the privacy flag.
    pub fn set_private(&mut self, is_private: bool, clock: &impl Clock) {
        self.is_private = is_private;
        self.updated_at = clock.utc();
    }
}
