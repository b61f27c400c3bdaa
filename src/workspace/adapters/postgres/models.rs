//! Diesel row models for workspace persistence.

use super::schema::{
    board_columns, board_members, boards, roles, task_dependencies, tasks, users,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// User row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// User identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Contact address.
    pub email: String,
}

/// Role row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoleRow {
    /// Role identifier.
    pub id: Uuid,
    /// Canonical role name.
    pub name: String,
}

/// Board row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    /// Board identifier.
    pub id: Uuid,
    /// Creating user.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Privacy flag.
    pub is_private: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Column row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = board_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    /// Column identifier.
    pub id: Uuid,
    /// Owning board.
    pub board_id: Uuid,
    /// Display name.
    pub name: String,
    /// 1-based ordinal position.
    pub position: i32,
    /// Final-column flag.
    pub is_final: bool,
}

/// Membership row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = board_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    /// Membership identifier.
    pub id: Uuid,
    /// Board.
    pub board_id: Uuid,
    /// Member user.
    pub user_id: Uuid,
    /// Granted role.
    pub role_id: Uuid,
    /// Join timestamp.
    pub joined_at: DateTime<Utc>,
}

/// Task row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning board.
    pub board_id: Uuid,
    /// Holding column.
    pub column_id: Uuid,
    /// Parent task for subtasks.
    pub parent_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Dependency edge row.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DependencyRow {
    /// Prerequisite task.
    pub task_id: Uuid,
    /// Dependent task.
    pub dependent_task_id: Uuid,
}
