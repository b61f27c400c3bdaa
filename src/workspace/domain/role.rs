//! Board membership roles and their privilege weights.

use super::{ParseRoleKindError, RoleId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of board membership roles.
///
/// Each role carries a numeric weight; a lower weight means a higher
/// privilege, so `Owner` (0) outranks `Viewer` (3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Full control over the board, including deletion.
    Owner,
    /// Manages columns and membership.
    Maintainer,
    /// Creates and edits tasks.
    Editor,
    /// Read-only access.
    Viewer,
}

impl RoleKind {
    /// Every role, ordered from most to least privileged.
    pub const ALL: [Self; 4] = [Self::Owner, Self::Maintainer, Self::Editor, Self::Viewer];

    /// Returns the privilege weight (lower is more privileged).
    #[must_use]
    pub const fn weight(self) -> u8 {
        match self {
            Self::Owner => 0,
            Self::Maintainer => 1,
            Self::Editor => 2,
            Self::Viewer => 3,
        }
    }

    /// Returns `true` when this role grants at least the `required` privilege.
    #[must_use]
    pub const fn satisfies(self, required: Self) -> bool {
        self.weight() <= required.weight()
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Maintainer => "maintainer",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl TryFrom<&str> for RoleKind {
    type Error = ParseRoleKindError;

    /// Parses a role by exact canonical name; no case folding is applied.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ParseRoleKindError(value.to_owned()))
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted role row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    kind: RoleKind,
}

impl Role {
    /// Creates a role row with a fresh identifier.
    #[must_use]
    pub fn new(kind: RoleKind) -> Self {
        Self {
            id: RoleId::new(),
            kind,
        }
    }

    /// Reconstructs a role from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: RoleId, kind: RoleKind) -> Self {
        Self { id, kind }
    }

    /// Returns the role identifier.
    #[must_use]
    pub const fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the role kind.
    #[must_use]
    pub const fn kind(&self) -> RoleKind {
        self.kind
    }
}
