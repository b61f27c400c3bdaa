//! Board columns and their 1-based ordinal positions.

use super::{BoardId, ColumnId, ColumnName, WorkspaceDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based rank of a column within its board's display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnPosition(u32);

impl ColumnPosition {
    /// The first position on a board.
    pub const FIRST: Self = Self(1);

    /// Creates a validated position.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::ZeroPosition`] for zero.
    pub const fn new(value: u32) -> Result<Self, WorkspaceDomainError> {
        if value == 0 {
            return Err(WorkspaceDomainError::ZeroPosition);
        }
        Ok(Self(value))
    }

    /// Returns the numeric position.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the position one rank later.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the position one rank earlier, stopping at [`Self::FIRST`].
    #[must_use]
    pub const fn previous(self) -> Self {
        if self.0 <= 1 {
            return Self::FIRST;
        }
        Self(self.0 - 1)
    }
}

impl fmt::Display for ColumnPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A column on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    id: ColumnId,
    board_id: BoardId,
    name: ColumnName,
    position: ColumnPosition,
    is_final: bool,
}

impl Column {
    /// Creates a non-final column at the given position.
    #[must_use]
    pub fn new(board_id: BoardId, name: ColumnName, position: ColumnPosition) -> Self {
        Self {
            id: ColumnId::new(),
            board_id,
            name,
            position,
            is_final: false,
        }
    }

    /// Reconstructs a column from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ColumnId,
        board_id: BoardId,
        name: ColumnName,
        position: ColumnPosition,
        is_final: bool,
    ) -> Self {
        Self {
            id,
            board_id,
            name,
            position,
            is_final,
        }
    }

    /// Returns the column identifier.
    #[must_use]
    pub const fn id(&self) -> ColumnId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the column name.
    #[must_use]
    pub const fn name(&self) -> &ColumnName {
        &self.name
    }

    /// Returns the ordinal position.
    #[must_use]
    pub const fn position(&self) -> ColumnPosition {
        self.position
    }

    /// Returns `true` when this is the board's final column.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    /// Renames the column.
    pub fn rename(&mut self, name: ColumnName) {
        self.name = name;
    }

    /// Moves the column to a new position.
    pub const fn set_position(&mut self, position: ColumnPosition) {
        self.position = position;
    }

    /// Sets or clears the final flag.
    pub const fn set_final(&mut self, is_final: bool) {
        self.is_final = is_final;
    }
}
