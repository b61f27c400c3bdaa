//! Service-level errors and their transport-agnostic classification.

use thiserror::Error;

use crate::cache::CacheError;
use crate::transaction::TransactionError;
use crate::workspace::domain::{
    BoardId, ColumnId, RoleKind, TaskId, UserId, WorkspaceDomainError,
};
use crate::workspace::ports::WorkspaceRepositoryError;

/// Coarse error category a transport layer maps onto its own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The request conflicts with existing state.
    Conflict,
    /// A numeric argument is outside the allowed range.
    OutOfRange,
    /// The acting user lacks the required role.
    Forbidden,
    /// An argument failed validation.
    Invalid,
    /// Infrastructure failure.
    Internal,
}

/// Errors returned by workspace services.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] WorkspaceDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkspaceRepositoryError),

    /// Cache operation failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The unit of work could not be opened or committed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// The acting user has no membership on the board.
    #[error("user {user_id} is not a member of board {board_id}")]
    NotMember {
        /// Board.
        board_id: BoardId,
        /// Acting user.
        user_id: UserId,
    },

    /// The acting user's role is too weak.
    #[error("board {board_id} requires {required}, user holds {actual}")]
    Forbidden {
        /// Board.
        board_id: BoardId,
        /// Role needed for the operation.
        required: RoleKind,
        /// Role the acting user holds.
        actual: RoleKind,
    },

    /// The board does not exist.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The user does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The role name or role row could not be resolved.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// The user is not a member of the board.
    #[error("user {user_id} has no membership on board {board_id}")]
    MembershipNotFound {
        /// Board.
        board_id: BoardId,
        /// User.
        user_id: UserId,
    },

    /// The user is already a member of the board.
    #[error("user {user_id} is already a member of board {board_id}")]
    AlreadyMember {
        /// Board.
        board_id: BoardId,
        /// User.
        user_id: UserId,
    },

    /// Another column on the board already uses the name.
    #[error("column {name:?} already exists on board {board_id}")]
    DuplicateColumnName {
        /// Board.
        board_id: BoardId,
        /// Conflicting name.
        name: String,
    },

    /// A requested column position is outside `1..=max`.
    #[error("position {requested} is outside 1..={max}")]
    PositionOutOfRange {
        /// Requested position.
        requested: i64,
        /// Highest position on the board.
        max: u32,
    },

    /// Two entities that must share a board do not.
    #[error("entity on board {actual} cannot be used on board {expected}")]
    CrossBoardReference {
        /// Board the operation targets.
        expected: BoardId,
        /// Board the referenced entity belongs to.
        actual: BoardId,
    },

    /// A cached payload could not be encoded.
    #[error("cache payload error: {0}")]
    CachePayload(#[source] serde_json::Error),
}

/// Result type for workspace service operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

impl WorkspaceError {
    /// Classifies the error for transport mapping.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::CrossBoardReference { .. } => ErrorKind::Invalid,
            Self::Repository(err) => repository_kind(err),
            Self::Cache(_) | Self::Transaction(_) | Self::CachePayload(_) => ErrorKind::Internal,
            Self::NotMember { .. } | Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::BoardNotFound(_)
            | Self::UserNotFound(_)
            | Self::ColumnNotFound(_)
            | Self::TaskNotFound(_)
            | Self::RoleNotFound(_)
            | Self::MembershipNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyMember { .. } | Self::DuplicateColumnName { .. } => ErrorKind::Conflict,
            Self::PositionOutOfRange { .. } => ErrorKind::OutOfRange,
        }
    }
}

const fn repository_kind(err: &WorkspaceRepositoryError) -> ErrorKind {
    match err {
        WorkspaceRepositoryError::BoardNotFound(_)
        | WorkspaceRepositoryError::ColumnNotFound(_)
        | WorkspaceRepositoryError::MemberNotFound(_)
        | WorkspaceRepositoryError::TaskNotFound(_)
        | WorkspaceRepositoryError::DependencyNotFound { .. } => ErrorKind::NotFound,
        WorkspaceRepositoryError::DuplicateColumnName { .. }
        | WorkspaceRepositoryError::DuplicateMembership { .. }
        | WorkspaceRepositoryError::DuplicateDependency { .. } => ErrorKind::Conflict,
        WorkspaceRepositoryError::SessionClosed
        | WorkspaceRepositoryError::InvalidPersistedData(_)
        | WorkspaceRepositoryError::Persistence(_) => ErrorKind::Internal,
    }
}
