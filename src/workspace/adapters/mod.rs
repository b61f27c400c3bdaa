//! Storage adapters for the workspace ports.

pub mod memory;
pub mod postgres;
