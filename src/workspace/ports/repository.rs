//! Repository ports for workspace persistence.
//!
//! Every method runs inside the unit of work of the session it is called
//! on. Writes stay invisible to other sessions until that session commits.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::workspace::domain::{
    Board, BoardId, BoardMember, Column, ColumnId, ColumnName, ColumnPosition, MemberId, Role,
    RoleId, RoleKind, Task, TaskDependency, TaskId, User, UserId,
};

/// Result type for workspace repository operations.
pub type WorkspaceRepositoryResult<T> = Result<T, WorkspaceRepositoryError>;

/// User lookup contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::Persistence`] when the backend
    /// rejects the row.
    async fn store_user(&self, user: &User) -> WorkspaceRepositoryResult<()>;

    /// Finds a user by identifier.
    async fn find_user(&self, id: UserId) -> WorkspaceRepositoryResult<Option<User>>;
}

/// Role lookup contract. Role rows are seeded by the store.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Finds a role by identifier.
    async fn find_role(&self, id: RoleId) -> WorkspaceRepositoryResult<Option<Role>>;

    /// Finds the role row for a role kind.
    async fn find_role_by_kind(&self, kind: RoleKind) -> WorkspaceRepositoryResult<Option<Role>>;
}

/// Board persistence contract.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Stores a new board.
    async fn insert_board(&self, board: &Board) -> WorkspaceRepositoryResult<()>;

    /// Finds a board by identifier.
    async fn find_board(&self, id: BoardId) -> WorkspaceRepositoryResult<Option<Board>>;

    /// Persists board changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::BoardNotFound`] when the board
    /// does not exist.
    async fn update_board(&self, board: &Board) -> WorkspaceRepositoryResult<()>;

    /// Deletes a board together with its columns, members, tasks, and
    /// dependency edges.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::BoardNotFound`] when the board
    /// does not exist.
    async fn delete_board(&self, id: BoardId) -> WorkspaceRepositoryResult<()>;

    /// Returns boards the user is a member of, oldest first.
    async fn list_boards_for_user(&self, user_id: UserId) -> WorkspaceRepositoryResult<Vec<Board>>;

    /// Takes the board's ordering lock for the rest of the unit of work.
    ///
    /// Concurrent sessions locking the same board wait until the holder
    /// commits or rolls back. Locking again in the same session is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::BoardNotFound`] when the board
    /// does not exist.
    async fn lock_board(&self, id: BoardId) -> WorkspaceRepositoryResult<()>;
}

/// Column persistence contract.
#[async_trait]
pub trait ColumnRepository: Send + Sync {
    /// Stores a new column.
    async fn insert_column(&self, column: &Column) -> WorkspaceRepositoryResult<()>;

    /// Finds a column by identifier.
    async fn find_column(&self, id: ColumnId) -> WorkspaceRepositoryResult<Option<Column>>;

    /// Finds a column on `board_id` by exact name.
    async fn find_column_by_name(
        &self,
        board_id: BoardId,
        name: &ColumnName,
    ) -> WorkspaceRepositoryResult<Option<Column>>;

    /// Returns the highest position on the board, or `None` when it has no
    /// columns.
    async fn max_position(&self, board_id: BoardId)
    -> WorkspaceRepositoryResult<Option<ColumnPosition>>;

    /// Returns the board's columns ordered by position.
    async fn list_columns(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Vec<Column>>;

    /// Returns the board's columns with `from <= position <= to`, ordered by
    /// position.
    async fn list_columns_between(
        &self,
        board_id: BoardId,
        from: ColumnPosition,
        to: ColumnPosition,
    ) -> WorkspaceRepositoryResult<Vec<Column>>;

    /// Persists column changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::ColumnNotFound`] when the column
    /// does not exist.
    async fn update_column(&self, column: &Column) -> WorkspaceRepositoryResult<()>;

    /// Clears the final flag on every column of the board.
    async fn clear_final_flags(&self, board_id: BoardId) -> WorkspaceRepositoryResult<()>;

    /// Deletes a column and the tasks placed in it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::ColumnNotFound`] when the column
    /// does not exist.
    async fn delete_column(&self, id: ColumnId) -> WorkspaceRepositoryResult<()>;
}

/// Board membership persistence contract.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Stores a new membership row.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::DuplicateMembership`] when the
    /// user already belongs to the board.
    async fn insert_member(&self, member: &BoardMember) -> WorkspaceRepositoryResult<()>;

    /// Finds the membership row for `(board_id, user_id)`.
    async fn find_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> WorkspaceRepositoryResult<Option<BoardMember>>;

    /// Persists membership changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::MemberNotFound`] when the row
    /// does not exist.
    async fn update_member(&self, member: &BoardMember) -> WorkspaceRepositoryResult<()>;

    /// Deletes a membership row.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::MemberNotFound`] when the row
    /// does not exist.
    async fn delete_member(&self, id: MemberId) -> WorkspaceRepositoryResult<()>;

    /// Returns the board's members, oldest first.
    async fn list_members(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Vec<BoardMember>>;
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    async fn insert_task(&self, task: &Task) -> WorkspaceRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> WorkspaceRepositoryResult<Option<Task>>;

    /// Persists task changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn update_task(&self, task: &Task) -> WorkspaceRepositoryResult<()>;

    /// Deletes a task, its subtasks, and every dependency edge touching
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::TaskNotFound`] when the task does
    /// not exist.
    async fn delete_task(&self, id: TaskId) -> WorkspaceRepositoryResult<()>;

    /// Returns the direct subtasks of `parent_id`, oldest first.
    async fn list_children(&self, parent_id: TaskId) -> WorkspaceRepositoryResult<Vec<Task>>;

    /// Stores a dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::DuplicateDependency`] when the
    /// edge already exists.
    async fn insert_dependency(&self, dependency: &TaskDependency)
    -> WorkspaceRepositoryResult<()>;

    /// Deletes a dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceRepositoryError::DependencyNotFound`] when the
    /// edge does not exist.
    async fn delete_dependency(&self, dependency: &TaskDependency)
    -> WorkspaceRepositoryResult<()>;

    /// Returns the edges whose dependent task is `task_id`.
    async fn list_dependencies(
        &self,
        task_id: TaskId,
    ) -> WorkspaceRepositoryResult<Vec<TaskDependency>>;
}

/// Errors returned by workspace repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkspaceRepositoryError {
    /// The board was not found.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The column was not found.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The membership row was not found.
    #[error("membership not found: {0}")]
    MemberNotFound(MemberId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// A column with the same name already exists on the board.
    #[error("column {name:?} already exists on board {board_id}")]
    DuplicateColumnName {
        /// Owning board.
        board_id: BoardId,
        /// Conflicting name.
        name: String,
    },

    /// The user already belongs to the board.
    #[error("user {user_id} is already a member of board {board_id}")]
    DuplicateMembership {
        /// Board.
        board_id: BoardId,
        /// User.
        user_id: UserId,
    },

    /// The dependency edge already exists.
    #[error("task {dependent_task_id} already depends on {task_id}")]
    DuplicateDependency {
        /// Prerequisite task.
        task_id: TaskId,
        /// Dependent task.
        dependent_task_id: TaskId,
    },

    /// The dependency edge does not exist.
    #[error("task {dependent_task_id} does not depend on {task_id}")]
    DependencyNotFound {
        /// Prerequisite task.
        task_id: TaskId,
        /// Dependent task.
        dependent_task_id: TaskId,
    },

    /// The session was already committed or rolled back.
    #[error("workspace session is closed")]
    SessionClosed,

    /// A stored row could not be turned back into a domain value.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkspaceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a row-conversion error.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a dependency edge into [`Self::DuplicateDependency`].
    #[must_use]
    pub const fn duplicate_dependency(dependency: &TaskDependency) -> Self {
        Self::DuplicateDependency {
            task_id: dependency.task_id(),
            dependent_task_id: dependency.dependent_task_id(),
        }
    }

    /// Wraps a dependency edge into [`Self::DependencyNotFound`].
    #[must_use]
    pub const fn dependency_not_found(dependency: &TaskDependency) -> Self {
        Self::DependencyNotFound {
            task_id: dependency.task_id(),
            dependent_task_id: dependency.dependent_task_id(),
        }
    }
}
