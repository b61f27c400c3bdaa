//! Error types for workspace domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing workspace domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkspaceDomainError {
    /// A name field is empty after trimming.
    #[error("{field} must not be empty")]
    EmptyName {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A name field exceeds its storage limit.
    #[error("{field} exceeds {max} character limit")]
    NameTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// Column positions are 1-based.
    #[error("column position must be at least 1")]
    ZeroPosition,

    /// The email address is not plausibly formed.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// A task may not depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(TaskId),
}

/// Error returned while parsing a role name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleKindError(pub String);
