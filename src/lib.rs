//! Corkboard: boards, ordered columns, role-weighted membership, and tasks.
//!
//! This crate provides the workspace core of a kanban-style project
//! tracker: dense column ordering per board, role-based access checks, and
//! a request-scoped unit of work that commits storage and cache writes
//! together.
//!
//! # Architecture
//!
//! Corkboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and cache
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//!
//! # Modules
//!
//! - [`workspace`]: Boards, columns, membership, tasks, and their services
//! - [`transaction`]: Request scopes and the commit/rollback coordinator
//! - [`cache`]: Cache port, in-memory backend, and request-scoped sessions
//! - [`notification`]: Fire-and-forget notifier port
//! - [`config`]: Environment configuration
//! - [`telemetry`]: Tracing subscriber installation
//! - [`app`]: Composition root

pub mod app;
pub mod cache;
pub mod config;
pub mod notification;
pub mod telemetry;
pub mod transaction;
pub mod workspace;
