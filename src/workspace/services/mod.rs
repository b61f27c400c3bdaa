//! Application services for boards, columns, membership, and tasks.
//!
//! Every operation takes the request's [`RequestScope`] and uses its store
//! session and cache session, so all of a request's writes commit or roll
//! back together.
//!
//! [`RequestScope`]: crate::transaction::RequestScope

mod access;
mod boards;
mod columns;
mod error;
mod membership;
mod tasks;
mod users;

pub use access::{AccessGuard, BoardOperation};
pub use boards::{BoardService, BoardUpdate};
pub use columns::{ColumnService, MoveOutcome, board_cache_prefix, columns_cache_key};
pub use error::{ErrorKind, WorkspaceError, WorkspaceResult};
pub use membership::MembershipService;
pub use tasks::{CreateTask, TaskService};
pub use users::UserService;
