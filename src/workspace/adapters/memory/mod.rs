//! In-memory workspace store for tests and single-process deployments.

mod repositories;
mod store;
mod tables;

pub use store::{InMemoryWorkspaceSession, InMemoryWorkspaceStore};
