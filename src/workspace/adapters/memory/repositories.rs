//! Repository port implementations for in-memory sessions.

use async_trait::async_trait;

use super::store::InMemoryWorkspaceSession;
use crate::workspace::domain::{
    Board, BoardId, BoardMember, Column, ColumnId, ColumnName, ColumnPosition, MemberId, Role,
    RoleId, RoleKind, Task, TaskDependency, TaskId, User, UserId,
};
use crate::workspace::ports::{
    BoardRepository, ColumnRepository, MembershipRepository, RoleRepository, TaskRepository,
    UserRepository, WorkspaceRepositoryError, WorkspaceRepositoryResult,
};

#[async_trait]
impl UserRepository for InMemoryWorkspaceSession {
    async fn store_user(&self, user: &User) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, _| {
            staged.users.put(user.id(), user.clone());
            Ok(())
        })
    }

    async fn find_user(&self, id: UserId) -> WorkspaceRepositoryResult<Option<User>> {
        self.read(|staged, committed| staged.users.get(&committed.users, &id))
    }
}

#[async_trait]
impl RoleRepository for InMemoryWorkspaceSession {
    async fn find_role(&self, id: RoleId) -> WorkspaceRepositoryResult<Option<Role>> {
        self.read(|_, committed| committed.roles.get(&id).copied())
    }

    async fn find_role_by_kind(&self, kind: RoleKind) -> WorkspaceRepositoryResult<Option<Role>> {
        self.read(|_, committed| {
            committed
                .roles
                .values()
                .find(|role| role.kind() == kind)
                .copied()
        })
    }
}

#[async_trait]
impl BoardRepository for InMemoryWorkspaceSession {
    async fn insert_board(&self, board: &Board) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, _| {
            staged.boards.put(board.id(), board.clone());
            Ok(())
        })
    }

    async fn find_board(&self, id: BoardId) -> WorkspaceRepositoryResult<Option<Board>> {
        self.read(|staged, committed| staged.boards.get(&committed.boards, &id))
    }

    async fn update_board(&self, board: &Board) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.boards.contains(&committed.boards, &board.id()) {
                return Err(WorkspaceRepositoryError::BoardNotFound(board.id()));
            }
            staged.boards.put(board.id(), board.clone());
            Ok(())
        })
    }

    async fn delete_board(&self, id: BoardId) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.boards.contains(&committed.boards, &id) {
                return Err(WorkspaceRepositoryError::BoardNotFound(id));
            }
            let tasks: Vec<TaskId> = staged
                .tasks
                .scan(&committed.tasks)
                .filter(|task| task.board_id() == id)
                .map(Task::id)
                .collect();
            let columns: Vec<ColumnId> = staged
                .columns
                .scan(&committed.columns)
                .filter(|column| column.board_id() == id)
                .map(Column::id)
                .collect();
            let members: Vec<MemberId> = staged
                .members
                .scan(&committed.members)
                .filter(|member| member.board_id() == id)
                .map(BoardMember::id)
                .collect();

            staged.remove_task_trees(committed, tasks);
            for column in columns {
                staged.columns.remove(column);
            }
            for member in members {
                staged.members.remove(member);
            }
            staged.boards.remove(id);
            Ok(())
        })
    }

    async fn list_boards_for_user(&self, user_id: UserId) -> WorkspaceRepositoryResult<Vec<Board>> {
        self.read(|staged, committed| {
            let mut boards: Vec<Board> = staged
                .members
                .scan(&committed.members)
                .filter(|member| member.user_id() == user_id)
                .filter_map(|member| staged.boards.get(&committed.boards, &member.board_id()))
                .collect();
            boards.sort_by_key(|board| (board.created_at(), board.id()));
            boards
        })
    }

    async fn lock_board(&self, id: BoardId) -> WorkspaceRepositoryResult<()> {
        let exists = self.read(|staged, committed| staged.boards.contains(&committed.boards, &id))?;
        if !exists {
            return Err(WorkspaceRepositoryError::BoardNotFound(id));
        }
        self.acquire_ordering_lock(id).await
    }
}

#[async_trait]
impl ColumnRepository for InMemoryWorkspaceSession {
    async fn insert_column(&self, column: &Column) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            let duplicate = staged.columns.scan(&committed.columns).any(|existing| {
                existing.board_id() == column.board_id() && existing.name() == column.name()
            });
            if duplicate {
                return Err(WorkspaceRepositoryError::DuplicateColumnName {
                    board_id: column.board_id(),
                    name: column.name().to_string(),
                });
            }
            staged.columns.put(column.id(), column.clone());
            Ok(())
        })
    }

    async fn find_column(&self, id: ColumnId) -> WorkspaceRepositoryResult<Option<Column>> {
        self.read(|staged, committed| staged.columns.get(&committed.columns, &id))
    }

    async fn find_column_by_name(
        &self,
        board_id: BoardId,
        name: &ColumnName,
    ) -> WorkspaceRepositoryResult<Option<Column>> {
        self.read(|staged, committed| {
            staged
                .columns
                .scan(&committed.columns)
                .find(|column| column.board_id() == board_id && column.name() == name)
                .cloned()
        })
    }

    async fn max_position(
        &self,
        board_id: BoardId,
    ) -> WorkspaceRepositoryResult<Option<ColumnPosition>> {
        self.read(|staged, committed| {
            staged
                .columns
                .scan(&committed.columns)
                .filter(|column| column.board_id() == board_id)
                .map(Column::position)
                .max()
        })
    }

    async fn list_columns(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Vec<Column>> {
        self.read(|staged, committed| {
            let mut columns: Vec<Column> = staged
                .columns
                .scan(&committed.columns)
                .filter(|column| column.board_id() == board_id)
                .cloned()
                .collect();
            columns.sort_by_key(|column| (column.position(), column.id()));
            columns
        })
    }

    async fn list_columns_between(
        &self,
        board_id: BoardId,
        from: ColumnPosition,
        to: ColumnPosition,
    ) -> WorkspaceRepositoryResult<Vec<Column>> {
        let columns = self.list_columns(board_id).await?;
        Ok(columns
            .into_iter()
            .filter(|column| (from..=to).contains(&column.position()))
            .collect())
    }

    async fn update_column(&self, column: &Column) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.columns.contains(&committed.columns, &column.id()) {
                return Err(WorkspaceRepositoryError::ColumnNotFound(column.id()));
            }
            let duplicate = staged.columns.scan(&committed.columns).any(|existing| {
                existing.id() != column.id()
                    && existing.board_id() == column.board_id()
                    && existing.name() == column.name()
            });
            if duplicate {
                return Err(WorkspaceRepositoryError::DuplicateColumnName {
                    board_id: column.board_id(),
                    name: column.name().to_string(),
                });
            }
            staged.columns.put(column.id(), column.clone());
            Ok(())
        })
    }

    async fn clear_final_flags(&self, board_id: BoardId) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            let finals: Vec<Column> = staged
                .columns
                .scan(&committed.columns)
                .filter(|column| column.board_id() == board_id && column.is_final())
                .cloned()
                .collect();
            for mut column in finals {
                column.set_final(false);
                staged.columns.put(column.id(), column);
            }
            Ok(())
        })
    }

    async fn delete_column(&self, id: ColumnId) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.columns.contains(&committed.columns, &id) {
                return Err(WorkspaceRepositoryError::ColumnNotFound(id));
            }
            let tasks: Vec<TaskId> = staged
                .tasks
                .scan(&committed.tasks)
                .filter(|task| task.column_id() == id)
                .map(Task::id)
                .collect();
            staged.remove_task_trees(committed, tasks);
            staged.columns.remove(id);
            Ok(())
        })
    }
}

#[async_trait]
impl MembershipRepository for InMemoryWorkspaceSession {
    async fn insert_member(&self, member: &BoardMember) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            let duplicate = staged.members.scan(&committed.members).any(|existing| {
                existing.board_id() == member.board_id() && existing.user_id() == member.user_id()
            });
            if duplicate {
                return Err(WorkspaceRepositoryError::DuplicateMembership {
                    board_id: member.board_id(),
                    user_id: member.user_id(),
                });
            }
            staged.members.put(member.id(), member.clone());
            Ok(())
        })
    }

    async fn find_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> WorkspaceRepositoryResult<Option<BoardMember>> {
        self.read(|staged, committed| {
            staged
                .members
                .scan(&committed.members)
                .find(|member| member.board_id() == board_id && member.user_id() == user_id)
                .cloned()
        })
    }

    async fn update_member(&self, member: &BoardMember) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.members.contains(&committed.members, &member.id()) {
                return Err(WorkspaceRepositoryError::MemberNotFound(member.id()));
            }
            staged.members.put(member.id(), member.clone());
            Ok(())
        })
    }

    async fn delete_member(&self, id: MemberId) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.members.contains(&committed.members, &id) {
                return Err(WorkspaceRepositoryError::MemberNotFound(id));
            }
            staged.members.remove(id);
            Ok(())
        })
    }

    async fn list_members(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Vec<BoardMember>> {
        self.read(|staged, committed| {
            let mut members: Vec<BoardMember> = staged
                .members
                .scan(&committed.members)
                .filter(|member| member.board_id() == board_id)
                .cloned()
                .collect();
            members.sort_by_key(|member| (member.joined_at(), member.id()));
            members
        })
    }
}

#[async_trait]
impl TaskRepository for InMemoryWorkspaceSession {
    async fn insert_task(&self, task: &Task) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, _| {
            staged.tasks.put(task.id(), task.clone());
            Ok(())
        })
    }

    async fn find_task(&self, id: TaskId) -> WorkspaceRepositoryResult<Option<Task>> {
        self.read(|staged, committed| staged.tasks.get(&committed.tasks, &id))
    }

    async fn update_task(&self, task: &Task) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.tasks.contains(&committed.tasks, &task.id()) {
                return Err(WorkspaceRepositoryError::TaskNotFound(task.id()));
            }
            staged.tasks.put(task.id(), task.clone());
            Ok(())
        })
    }

    async fn delete_task(&self, id: TaskId) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged.tasks.contains(&committed.tasks, &id) {
                return Err(WorkspaceRepositoryError::TaskNotFound(id));
            }
            staged.remove_task_trees(committed, vec![id]);
            Ok(())
        })
    }

    async fn list_children(&self, parent_id: TaskId) -> WorkspaceRepositoryResult<Vec<Task>> {
        self.read(|staged, committed| {
            let mut children: Vec<Task> = staged
                .tasks
                .scan(&committed.tasks)
                .filter(|task| task.parent_id() == Some(parent_id))
                .cloned()
                .collect();
            children.sort_by_key(|task| (task.created_at(), task.id()));
            children
        })
    }

    async fn insert_dependency(
        &self,
        dependency: &TaskDependency,
    ) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if staged
                .dependencies
                .contains(&committed.dependencies, dependency)
            {
                return Err(WorkspaceRepositoryError::duplicate_dependency(dependency));
            }
            staged.dependencies.put(*dependency, ());
            Ok(())
        })
    }

    async fn delete_dependency(
        &self,
        dependency: &TaskDependency,
    ) -> WorkspaceRepositoryResult<()> {
        self.write(|staged, committed| {
            if !staged
                .dependencies
                .contains(&committed.dependencies, dependency)
            {
                return Err(WorkspaceRepositoryError::dependency_not_found(dependency));
            }
            staged.dependencies.remove(*dependency);
            Ok(())
        })
    }

    async fn list_dependencies(
        &self,
        task_id: TaskId,
    ) -> WorkspaceRepositoryResult<Vec<TaskDependency>> {
        self.read(|staged, committed| {
            let mut edges: Vec<TaskDependency> = staged
                .dependencies
                .keys(&committed.dependencies)
                .filter(|edge| edge.dependent_task_id() == task_id)
                .collect();
            edges.sort_by_key(|edge| edge.task_id());
            edges
        })
    }
}
