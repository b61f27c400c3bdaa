//! Per-request units of work spanning the store and the cache.
//!
//! A request runs through [`TransactionCoordinator::run`], which opens a
//! [`RequestScope`], hands it to the handler, and then commits or rolls back
//! every participating [`Committer`] based on the handler's
//! [`HandlerOutcome`].

mod committer;
mod coordinator;
mod error;
mod scope;

pub use committer::{Committer, CompositeCommitter};
pub use coordinator::{HandlerOutcome, TransactionCoordinator};
pub use error::{TransactionError, TransactionResult};
pub use scope::{RequestId, RequestScope};
