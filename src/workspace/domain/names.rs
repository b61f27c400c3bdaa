//! Validated display names for boards, columns, and tasks.

use super::WorkspaceDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage limit shared by all name columns.
pub const MAX_NAME_LENGTH: usize = 255;

fn validate_name(field: &'static str, raw: &str) -> Result<String, WorkspaceDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WorkspaceDomainError::EmptyName { field });
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(WorkspaceDomainError::NameTooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(trimmed.to_owned())
}

/// Board display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardName(String);

impl BoardName {
    /// Creates a validated board name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::EmptyName`] or
    /// [`WorkspaceDomainError::NameTooLong`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, WorkspaceDomainError> {
        validate_name("board name", value.as_ref()).map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Column display name, unique within its board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnName(String);

impl ColumnName {
    /// Creates a validated column name.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::EmptyName`] or
    /// [`WorkspaceDomainError::NameTooLong`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, WorkspaceDomainError> {
        validate_name("column name", value.as_ref()).map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::EmptyName`] or
    /// [`WorkspaceDomainError::NameTooLong`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, WorkspaceDomainError> {
        validate_name("task title", value.as_ref()).map(Self)
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_name_traits {
    ($($name:ident),+) => {
        $(
            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    self.as_str()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

impl_name_traits!(BoardName, ColumnName, TaskTitle);
