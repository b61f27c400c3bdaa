//! Domain model for boards, columns, membership, and tasks.
//!
//! Domain values validate their own invariants and carry no infrastructure
//! concerns. Ordering and authorization rules that span several rows live
//! in the services layer.

mod board;
mod column;
mod error;
mod ids;
mod member;
mod names;
mod role;
mod task;
mod user;

pub use board::{Board, PersistedBoardData};
pub use column::{Column, ColumnPosition};
pub use error::{ParseRoleKindError, WorkspaceDomainError};
pub use ids::{BoardId, ColumnId, MemberId, RoleId, TaskId, UserId};
pub use member::BoardMember;
pub use names::{BoardName, ColumnName, MAX_NAME_LENGTH, TaskTitle};
pub use role::{Role, RoleKind};
pub use task::{NewTaskData, PersistedTaskData, Task, TaskDependency};
pub use user::User;
