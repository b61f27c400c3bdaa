//! Task placement, subtask trees, and dependency edges.

use mockable::Clock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use super::access::{AccessGuard, BoardOperation};
use super::{WorkspaceError, WorkspaceResult};
use crate::transaction::RequestScope;
use crate::workspace::domain::{
    BoardId, ColumnId, NewTaskData, Task, TaskDependency, TaskId, TaskTitle,
};
use crate::workspace::ports::{WorkspaceRepositoryError, WorkspaceSession};

/// Parameters for [`TaskService::create_task`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    /// Column receiving the task.
    pub column_id: ColumnId,
    /// Task title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Parent task for subtasks. Must live on the same board.
    pub parent_id: Option<TaskId>,
}

/// Creates, moves, and links tasks.
#[derive(Clone)]
pub struct TaskService<C>
where
    C: Clock + Send + Sync,
{
    clock: Arc<C>,
}

impl<C> TaskService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(clock: Arc<C>) -> Self {
        Self { clock }
    }

    /// Creates a task in a column.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::ColumnNotFound`] or
    /// [`WorkspaceError::TaskNotFound`] for unknown references,
    /// [`WorkspaceError::CrossBoardReference`] when the parent lives on
    /// another board, and access errors when the actor is not at least an
    /// editor.
    pub async fn create_task<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        request: CreateTask,
    ) -> WorkspaceResult<Task> {
        let title = TaskTitle::new(&request.title)?;
        let store = scope.store();
        let column = store
            .find_column(request.column_id)
            .await?
            .ok_or(WorkspaceError::ColumnNotFound(request.column_id))?;
        let board_id = column.board_id();
        AccessGuard::authorize(store, BoardOperation::EditTasks, scope.actor(), board_id).await?;

        if let Some(parent_id) = request.parent_id {
            let parent = find_task(store, parent_id).await?;
            ensure_same_board(board_id, parent.board_id())?;
        }

        let task = Task::new(
            NewTaskData {
                board_id,
                column_id: column.id(),
                parent_id: request.parent_id,
                title,
                description: request.description,
                created_by: scope.actor(),
            },
            &*self.clock,
        );
        store.insert_task(&task).await?;
        debug!(%board_id, task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Moves a task to another column of its board.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::TaskNotFound`] or
    /// [`WorkspaceError::ColumnNotFound`] for unknown references,
    /// [`WorkspaceError::CrossBoardReference`] when the column belongs to
    /// another board, and access errors when the actor is not at least an
    /// editor.
    pub async fn move_task<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        task_id: TaskId,
        column_id: ColumnId,
    ) -> WorkspaceResult<Task> {
        let store = scope.store();
        let mut task = find_task(store, task_id).await?;
        let board_id = task.board_id();
        AccessGuard::authorize(store, BoardOperation::EditTasks, scope.actor(), board_id).await?;
        let column = store
            .find_column(column_id)
            .await?
            .ok_or(WorkspaceError::ColumnNotFound(column_id))?;
        ensure_same_board(board_id, column.board_id())?;

        if task.column_id() != column_id {
            task.move_to_column(column_id, &*self.clock);
            store.update_task(&task).await?;
            debug!(%board_id, %task_id, %column_id, "task moved");
        }
        Ok(task)
    }

    /// Deletes a task, its subtasks, and every edge touching them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::TaskNotFound`] for unknown tasks and access
    /// errors when the actor is not at least an editor.
    pub async fn delete_task<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        task_id: TaskId,
    ) -> WorkspaceResult<()> {
        let store = scope.store();
        let task = find_task(store, task_id).await?;
        AccessGuard::authorize(store, BoardOperation::EditTasks, scope.actor(), task.board_id())
            .await?;
        store.delete_task(task_id).await.map_err(|err| match err {
            WorkspaceRepositoryError::TaskNotFound(id) => WorkspaceError::TaskNotFound(id),
            other => WorkspaceError::Repository(other),
        })?;
        debug!(board_id = %task.board_id(), %task_id, "task deleted");
        Ok(())
    }

    /// Records that `dependent_task_id` waits on `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Domain`] for self-dependencies,
    /// [`WorkspaceError::TaskNotFound`] for unknown tasks,
    /// [`WorkspaceError::CrossBoardReference`] when the tasks live on
    /// different boards, and a repository conflict when the edge exists.
    pub async fn add_dependency<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        task_id: TaskId,
        dependent_task_id: TaskId,
    ) -> WorkspaceResult<TaskDependency> {
        let dependency = TaskDependency::new(task_id, dependent_task_id)?;
        let board_id = linked_board(scope, &dependency).await?;
        scope.store().insert_dependency(&dependency).await?;
        debug!(%board_id, %task_id, %dependent_task_id, "dependency added");
        Ok(dependency)
    }

    /// Removes a dependency edge.
    ///
    /// # Errors
    ///
    /// Returns the same reference and access errors as
    /// [`TaskService::add_dependency`], plus a repository not-found error
    /// when the edge does not exist.
    pub async fn remove_dependency<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        task_id: TaskId,
        dependent_task_id: TaskId,
    ) -> WorkspaceResult<()> {
        let dependency = TaskDependency::new(task_id, dependent_task_id)?;
        let board_id = linked_board(scope, &dependency).await?;
        scope.store().delete_dependency(&dependency).await?;
        debug!(%board_id, %task_id, %dependent_task_id, "dependency removed");
        Ok(())
    }

    /// Returns the edges `task_id` waits on.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::TaskNotFound`] for unknown tasks and access
    /// errors when the task's board is private and unreadable.
    pub async fn list_dependencies<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        task_id: TaskId,
    ) -> WorkspaceResult<Vec<TaskDependency>> {
        let store = scope.store();
        let task = find_task(store, task_id).await?;
        AccessGuard::readable_board(store, scope.actor(), task.board_id()).await?;
        Ok(store.list_dependencies(task_id).await?)
    }

    /// Returns every descendant of `task_id`, breadth first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::TaskNotFound`] for unknown tasks and access
    /// errors when the task's board is private and unreadable.
    pub async fn list_children<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        task_id: TaskId,
    ) -> WorkspaceResult<Vec<Task>> {
        let store = scope.store();
        let root = find_task(store, task_id).await?;
        AccessGuard::readable_board(store, scope.actor(), root.board_id()).await?;

        let mut descendants = Vec::new();
        let mut pending = VecDeque::from([task_id]);
        while let Some(parent_id) = pending.pop_front() {
            for child in store.list_children(parent_id).await? {
                pending.push_back(child.id());
                descendants.push(child);
            }
        }
        Ok(descendants)
    }
}

async fn find_task<S: WorkspaceSession>(store: &S, task_id: TaskId) -> WorkspaceResult<Task> {
    store
        .find_task(task_id)
        .await?
        .ok_or(WorkspaceError::TaskNotFound(task_id))
}

fn ensure_same_board(expected: BoardId, actual: BoardId) -> WorkspaceResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(WorkspaceError::CrossBoardReference { expected, actual })
    }
}

/// Loads both ends of an edge, checks they share a board, and authorizes
/// task editing there.
async fn linked_board<S: WorkspaceSession>(
    scope: &RequestScope<S>,
    dependency: &TaskDependency,
) -> WorkspaceResult<BoardId> {
    let store = scope.store();
    let prerequisite = find_task(store, dependency.task_id()).await?;
    let dependent = find_task(store, dependency.dependent_task_id()).await?;
    let board_id = prerequisite.board_id();
    ensure_same_board(board_id, dependent.board_id())?;
    AccessGuard::authorize(store, BoardOperation::EditTasks, scope.actor(), board_id).await?;
    Ok(board_id)
}
