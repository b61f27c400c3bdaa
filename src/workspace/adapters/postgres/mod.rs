//! `PostgreSQL` adapters for workspace persistence.

mod models;
mod repositories;
mod schema;
mod store;

pub use store::{PostgresWorkspaceSession, PostgresWorkspaceStore, WorkspacePgPool};
