//! Storage ports for the workspace context.

mod repository;
mod store;

pub use repository::{
    BoardRepository, ColumnRepository, MembershipRepository, RoleRepository, TaskRepository,
    UserRepository, WorkspaceRepositoryError, WorkspaceRepositoryResult,
};
pub use store::{WorkspaceSession, WorkspaceStore};
