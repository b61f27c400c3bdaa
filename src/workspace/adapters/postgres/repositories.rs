//! Repository port implementations for `PostgreSQL` sessions.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use super::models::{BoardRow, ColumnRow, DependencyRow, MemberRow, RoleRow, TaskRow, UserRow};
use super::schema::{
    board_columns, board_members, boards, roles, task_dependencies, tasks, users,
};
use super::store::PostgresWorkspaceSession;
use crate::workspace::domain::{
    Board, BoardId, BoardMember, BoardName, Column, ColumnId, ColumnName, ColumnPosition,
    MemberId, NewTaskData, PersistedBoardData, PersistedTaskData, Role, RoleId, RoleKind, Task,
    TaskDependency, TaskId, TaskTitle, User, UserId,
};
use crate::workspace::ports::{
    BoardRepository, ColumnRepository, MembershipRepository, RoleRepository, TaskRepository,
    UserRepository, WorkspaceRepositoryError, WorkspaceRepositoryResult,
};

const COLUMN_NAME_CONSTRAINT: &str = "board_columns_board_id_name_key";
const MEMBERSHIP_CONSTRAINT: &str = "board_members_board_id_user_id_key";
const DEPENDENCY_CONSTRAINT: &str = "task_dependencies_pkey";

#[async_trait]
impl UserRepository for PostgresWorkspaceSession {
    async fn store_user(&self, user: &User) -> WorkspaceRepositoryResult<()> {
        let row = UserRow {
            id: user.id().into_inner(),
            username: user.username().to_owned(),
            email: user.email().to_owned(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_user(&self, id: UserId) -> WorkspaceRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = users::table
                .find(id.into_inner())
                .select(UserRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(row.map(row_to_user))
        })
        .await
    }
}

#[async_trait]
impl RoleRepository for PostgresWorkspaceSession {
    async fn find_role(&self, id: RoleId) -> WorkspaceRepositoryResult<Option<Role>> {
        self.run_blocking(move |connection| {
            let row = roles::table
                .find(id.into_inner())
                .select(RoleRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            row.map(row_to_role).transpose()
        })
        .await
    }

    async fn find_role_by_kind(&self, kind: RoleKind) -> WorkspaceRepositoryResult<Option<Role>> {
        self.run_blocking(move |connection| {
            let row = roles::table
                .filter(roles::name.eq(kind.as_str()))
                .select(RoleRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            row.map(row_to_role).transpose()
        })
        .await
    }
}

#[async_trait]
impl BoardRepository for PostgresWorkspaceSession {
    async fn insert_board(&self, board: &Board) -> WorkspaceRepositoryResult<()> {
        let row = board_to_row(board);
        self.run_blocking(move |connection| {
            diesel::insert_into(boards::table)
                .values(&row)
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_board(&self, id: BoardId) -> WorkspaceRepositoryResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let row = boards::table
                .find(id.into_inner())
                .select(BoardRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            row.map(row_to_board).transpose()
        })
        .await
    }

    async fn update_board(&self, board: &Board) -> WorkspaceRepositoryResult<()> {
        let row = board_to_row(board);
        let board_id = board.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(boards::table.find(row.id))
                .set((
                    boards::name.eq(&row.name),
                    boards::is_private.eq(row.is_private),
                    boards::updated_at.eq(row.updated_at),
                ))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if updated == 0 {
                return Err(WorkspaceRepositoryError::BoardNotFound(board_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_board(&self, id: BoardId) -> WorkspaceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(boards::table.find(id.into_inner()))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(WorkspaceRepositoryError::BoardNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_boards_for_user(&self, user_id: UserId) -> WorkspaceRepositoryResult<Vec<Board>> {
        self.run_blocking(move |connection| {
            let rows = boards::table
                .inner_join(board_members::table)
                .filter(board_members::user_id.eq(user_id.into_inner()))
                .order((boards::created_at.asc(), boards::id.asc()))
                .select(BoardRow::as_select())
                .load(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_board).collect()
        })
        .await
    }

    async fn lock_board(&self, id: BoardId) -> WorkspaceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let locked = boards::table
                .find(id.into_inner())
                .select(boards::id)
                .for_update()
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            locked
                .map(drop)
                .ok_or(WorkspaceRepositoryError::BoardNotFound(id))
        })
        .await
    }
}

#[async_trait]
impl ColumnRepository for PostgresWorkspaceSession {
    async fn insert_column(&self, column: &Column) -> WorkspaceRepositoryResult<()> {
        let row = column_to_row(column)?;
        let board_id = column.board_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(board_columns::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_column_write_error(err, board_id, &row.name))?;
            Ok(())
        })
        .await
    }

    async fn find_column(&self, id: ColumnId) -> WorkspaceRepositoryResult<Option<Column>> {
        self.run_blocking(move |connection| {
            let row = board_columns::table
                .find(id.into_inner())
                .select(ColumnRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            row.map(row_to_column).transpose()
        })
        .await
    }

    async fn find_column_by_name(
        &self,
        board_id: BoardId,
        name: &ColumnName,
    ) -> WorkspaceRepositoryResult<Option<Column>> {
        let lookup_name = name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = board_columns::table
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .filter(board_columns::name.eq(&lookup_name))
                .select(ColumnRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            row.map(row_to_column).transpose()
        })
        .await
    }

    async fn max_position(
        &self,
        board_id: BoardId,
    ) -> WorkspaceRepositoryResult<Option<ColumnPosition>> {
        self.run_blocking(move |connection| {
            let max = board_columns::table
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .select(diesel::dsl::max(board_columns::position))
                .first::<Option<i32>>(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            max.map(position_from_row).transpose()
        })
        .await
    }

    async fn list_columns(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Vec<Column>> {
        self.run_blocking(move |connection| {
            let rows = board_columns::table
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .order((board_columns::position.asc(), board_columns::id.asc()))
                .select(ColumnRow::as_select())
                .load(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_column).collect()
        })
        .await
    }

    async fn list_columns_between(
        &self,
        board_id: BoardId,
        from: ColumnPosition,
        to: ColumnPosition,
    ) -> WorkspaceRepositoryResult<Vec<Column>> {
        let lower = position_to_row(from)?;
        let upper = position_to_row(to)?;
        self.run_blocking(move |connection| {
            let rows = board_columns::table
                .filter(board_columns::board_id.eq(board_id.into_inner()))
                .filter(board_columns::position.between(lower, upper))
                .order((board_columns::position.asc(), board_columns::id.asc()))
                .select(ColumnRow::as_select())
                .load(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_column).collect()
        })
        .await
    }

    async fn update_column(&self, column: &Column) -> WorkspaceRepositoryResult<()> {
        let row = column_to_row(column)?;
        let column_id = column.id();
        let board_id = column.board_id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(board_columns::table.find(row.id))
                .set((
                    board_columns::name.eq(&row.name),
                    board_columns::position.eq(row.position),
                    board_columns::is_final.eq(row.is_final),
                ))
                .execute(connection)
                .map_err(|err| map_column_write_error(err, board_id, &row.name))?;
            if updated == 0 {
                return Err(WorkspaceRepositoryError::ColumnNotFound(column_id));
            }
            Ok(())
        })
        .await
    }

    async fn clear_final_flags(&self, board_id: BoardId) -> WorkspaceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            diesel::update(
                board_columns::table
                    .filter(board_columns::board_id.eq(board_id.into_inner()))
                    .filter(board_columns::is_final.eq(true)),
            )
            .set(board_columns::is_final.eq(false))
            .execute(connection)
            .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn delete_column(&self, id: ColumnId) -> WorkspaceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(board_columns::table.find(id.into_inner()))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(WorkspaceRepositoryError::ColumnNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl MembershipRepository for PostgresWorkspaceSession {
    async fn insert_member(&self, member: &BoardMember) -> WorkspaceRepositoryResult<()> {
        let row = member_to_row(member);
        let board_id = member.board_id();
        let user_id = member.user_id();
        self.run_blocking(move |connection| {
            diesel::insert_into(board_members::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), MEMBERSHIP_CONSTRAINT) =>
                    {
                        WorkspaceRepositoryError::DuplicateMembership { board_id, user_id }
                    }
                    _ => WorkspaceRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> WorkspaceRepositoryResult<Option<BoardMember>> {
        self.run_blocking(move |connection| {
            let row = board_members::table
                .filter(board_members::board_id.eq(board_id.into_inner()))
                .filter(board_members::user_id.eq(user_id.into_inner()))
                .select(MemberRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(row.map(row_to_member))
        })
        .await
    }

    async fn update_member(&self, member: &BoardMember) -> WorkspaceRepositoryResult<()> {
        let member_id = member.id();
        let role_id = member.role_id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(board_members::table.find(member_id.into_inner()))
                .set(board_members::role_id.eq(role_id.into_inner()))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if updated == 0 {
                return Err(WorkspaceRepositoryError::MemberNotFound(member_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_member(&self, id: MemberId) -> WorkspaceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(board_members::table.find(id.into_inner()))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(WorkspaceRepositoryError::MemberNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_members(&self, board_id: BoardId) -> WorkspaceRepositoryResult<Vec<BoardMember>> {
        self.run_blocking(move |connection| {
            let rows = board_members::table
                .filter(board_members::board_id.eq(board_id.into_inner()))
                .order((board_members::joined_at.asc(), board_members::id.asc()))
                .select(MemberRow::as_select())
                .load(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_member).collect())
        })
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresWorkspaceSession {
    async fn insert_task(&self, task: &Task) -> WorkspaceRepositoryResult<()> {
        let row = task_to_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> WorkspaceRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first(connection)
                .optional()
                .map_err(WorkspaceRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn update_task(&self, task: &Task) -> WorkspaceRepositoryResult<()> {
        let row = task_to_row(task);
        let task_id = task.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(tasks::table.find(row.id))
                .set((
                    tasks::column_id.eq(row.column_id),
                    tasks::title.eq(&row.title),
                    tasks::description.eq(&row.description),
                    tasks::updated_at.eq(row.updated_at),
                ))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if updated == 0 {
                return Err(WorkspaceRepositoryError::TaskNotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> WorkspaceRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(WorkspaceRepositoryError::TaskNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_children(&self, parent_id: TaskId) -> WorkspaceRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::parent_id.eq(parent_id.into_inner()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn insert_dependency(
        &self,
        dependency: &TaskDependency,
    ) -> WorkspaceRepositoryResult<()> {
        let edge = *dependency;
        let row = DependencyRow {
            task_id: edge.task_id().into_inner(),
            dependent_task_id: edge.dependent_task_id().into_inner(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(task_dependencies::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), DEPENDENCY_CONSTRAINT) =>
                    {
                        WorkspaceRepositoryError::duplicate_dependency(&edge)
                    }
                    _ => WorkspaceRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn delete_dependency(
        &self,
        dependency: &TaskDependency,
    ) -> WorkspaceRepositoryResult<()> {
        let edge = *dependency;
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                task_dependencies::table.find((
                    edge.task_id().into_inner(),
                    edge.dependent_task_id().into_inner(),
                )),
            )
            .execute(connection)
            .map_err(WorkspaceRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(WorkspaceRepositoryError::dependency_not_found(&edge));
            }
            Ok(())
        })
        .await
    }

    async fn list_dependencies(
        &self,
        task_id: TaskId,
    ) -> WorkspaceRepositoryResult<Vec<TaskDependency>> {
        self.run_blocking(move |connection| {
            let rows = task_dependencies::table
                .filter(task_dependencies::dependent_task_id.eq(task_id.into_inner()))
                .order(task_dependencies::task_id.asc())
                .select(DependencyRow::as_select())
                .load(connection)
                .map_err(WorkspaceRepositoryError::persistence)?;
            rows.into_iter().map(row_to_dependency).collect()
        })
        .await
    }
}

fn violates(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}

fn map_column_write_error(err: DieselError, board_id: BoardId, name: &str) -> WorkspaceRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if violates(info.as_ref(), COLUMN_NAME_CONSTRAINT) =>
        {
            WorkspaceRepositoryError::DuplicateColumnName {
                board_id,
                name: name.to_owned(),
            }
        }
        _ => WorkspaceRepositoryError::persistence(err),
    }
}

fn row_to_user(row: UserRow) -> User {
    User::from_persisted(UserId::from_uuid(row.id), row.username, row.email)
}

fn row_to_role(row: RoleRow) -> WorkspaceRepositoryResult<Role> {
    let kind = RoleKind::try_from(row.name.as_str())
        .map_err(WorkspaceRepositoryError::invalid_persisted_data)?;
    Ok(Role::from_persisted(RoleId::from_uuid(row.id), kind))
}

fn board_to_row(board: &Board) -> BoardRow {
    BoardRow {
        id: board.id().into_inner(),
        owner_id: board.owner_id().into_inner(),
        name: board.name().as_str().to_owned(),
        is_private: board.is_private(),
        created_at: board.created_at(),
        updated_at: board.updated_at(),
    }
}

fn row_to_board(row: BoardRow) -> WorkspaceRepositoryResult<Board> {
    let name = BoardName::new(&row.name).map_err(WorkspaceRepositoryError::invalid_persisted_data)?;
    Ok(Board::from_persisted(PersistedBoardData {
        id: BoardId::from_uuid(row.id),
        owner_id: UserId::from_uuid(row.owner_id),
        name,
        is_private: row.is_private,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn position_to_row(position: ColumnPosition) -> WorkspaceRepositoryResult<i32> {
    i32::try_from(position.value()).map_err(WorkspaceRepositoryError::persistence)
}

fn position_from_row(position: i32) -> WorkspaceRepositoryResult<ColumnPosition> {
    let value = u32::try_from(position).map_err(WorkspaceRepositoryError::invalid_persisted_data)?;
    ColumnPosition::new(value).map_err(WorkspaceRepositoryError::invalid_persisted_data)
}

fn column_to_row(column: &Column) -> WorkspaceRepositoryResult<ColumnRow> {
    Ok(ColumnRow {
        id: column.id().into_inner(),
        board_id: column.board_id().into_inner(),
        name: column.name().as_str().to_owned(),
        position: position_to_row(column.position())?,
        is_final: column.is_final(),
    })
}

fn row_to_column(row: ColumnRow) -> WorkspaceRepositoryResult<Column> {
    let name =
        ColumnName::new(&row.name).map_err(WorkspaceRepositoryError::invalid_persisted_data)?;
    Ok(Column::from_persisted(
        ColumnId::from_uuid(row.id),
        BoardId::from_uuid(row.board_id),
        name,
        position_from_row(row.position)?,
        row.is_final,
    ))
}

const fn member_to_row(member: &BoardMember) -> MemberRow {
    MemberRow {
        id: member.id().into_inner(),
        board_id: member.board_id().into_inner(),
        user_id: member.user_id().into_inner(),
        role_id: member.role_id().into_inner(),
        joined_at: member.joined_at(),
    }
}

const fn row_to_member(row: MemberRow) -> BoardMember {
    BoardMember::from_persisted(
        MemberId::from_uuid(row.id),
        BoardId::from_uuid(row.board_id),
        UserId::from_uuid(row.user_id),
        RoleId::from_uuid(row.role_id),
        row.joined_at,
    )
}

fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        board_id: task.board_id().into_inner(),
        column_id: task.column_id().into_inner(),
        parent_id: task.parent_id().map(TaskId::into_inner),
        title: task.title().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        created_by: task.created_by().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> WorkspaceRepositoryResult<Task> {
    let title = TaskTitle::new(&row.title).map_err(WorkspaceRepositoryError::invalid_persisted_data)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        data: NewTaskData {
            board_id: BoardId::from_uuid(row.board_id),
            column_id: ColumnId::from_uuid(row.column_id),
            parent_id: row.parent_id.map(TaskId::from_uuid),
            title,
            description: row.description,
            created_by: UserId::from_uuid(row.created_by),
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_dependency(row: DependencyRow) -> WorkspaceRepositoryResult<TaskDependency> {
    TaskDependency::new(
        TaskId::from_uuid(row.task_id),
        TaskId::from_uuid(row.dependent_task_id),
    )
    .map_err(WorkspaceRepositoryError::invalid_persisted_data)
}
