//! Tasks, subtask nesting, and task dependency edges.

use super::{BoardId, ColumnId, TaskId, TaskTitle, UserId, WorkspaceDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A task placed in a board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    board_id: BoardId,
    column_id: ColumnId,
    parent_id: Option<TaskId>,
    title: TaskTitle,
    description: Option<String>,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskData {
    /// Board the task belongs to.
    pub board_id: BoardId,
    /// Column holding the task.
    pub column_id: ColumnId,
    /// Parent task when this is a subtask.
    pub parent_id: Option<TaskId>,
    /// Task title.
    pub title: TaskTitle,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Creating user.
    pub created_by: UserId,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted task fields.
    pub data: NewTaskData,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    #[must_use]
    pub fn new(data: NewTaskData, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            board_id: data.board_id,
            column_id: data.column_id,
            parent_id: data.parent_id,
            title: data.title,
            description: data.description,
            created_by: data.created_by,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(persisted: PersistedTaskData) -> Self {
        let PersistedTaskData {
            id,
            data,
            created_at,
            updated_at,
        } = persisted;
        Self {
            id,
            board_id: data.board_id,
            column_id: data.column_id,
            parent_id: data.parent_id,
            title: data.title,
            description: data.description,
            created_by: data.created_by,
            created_at,
            updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the column holding the task.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the parent task, if this is a subtask.
    #[must_use]
    pub const fn parent_id(&self) -> Option<TaskId> {
        self.parent_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
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

    /// Moves the task to another column of the same board.
    pub fn move_to_column(&mut self, column_id: ColumnId, clock: &impl Clock) {
        self.column_id = column_id;
        self.updated_at = clock.utc();
    }
}

/// Directed dependency edge: `dependent_task_id` depends on `task_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskDependency {
    task_id: TaskId,
    dependent_task_id: TaskId,
}

impl TaskDependency {
    /// Creates a dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::SelfDependency`] when both ends are the
    /// same task.
    pub fn new(task_id: TaskId, dependent_task_id: TaskId) -> Result<Self, WorkspaceDomainError> {
        if task_id == dependent_task_id {
            return Err(WorkspaceDomainError::SelfDependency(task_id));
        }
        Ok(Self {
            task_id,
            dependent_task_id,
        })
    }

    /// Returns the task that must complete first.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the task waiting on [`Self::task_id`].
    #[must_use]
    pub const fn dependent_task_id(&self) -> TaskId {
        self.dependent_task_id
    }
}
