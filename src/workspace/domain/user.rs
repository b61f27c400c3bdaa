//! User accounts as seen by the workspace core.

use super::{UserId, WorkspaceDomainError};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// Credentials live with the authentication collaborator; the workspace
/// only needs identity and a contact address for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
}

impl User {
    /// Creates a validated user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceDomainError::EmptyName`] for a blank username or
    /// [`WorkspaceDomainError::InvalidEmail`] when the address has no `@`
    /// separating a local part and a domain.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, WorkspaceDomainError> {
        let raw_username = username.into();
        let trimmed_username = raw_username.trim();
        if trimmed_username.is_empty() {
            return Err(WorkspaceDomainError::EmptyName { field: "username" });
        }

        let raw_email = email.into();
        let trimmed_email = raw_email.trim();
        let is_plausible = trimmed_email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !is_plausible {
            return Err(WorkspaceDomainError::InvalidEmail(raw_email));
        }

        Ok(Self {
            id: UserId::new(),
            username: trimmed_username.to_owned(),
            email: trimmed_email.to_owned(),
        })
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: UserId, username: String, email: String) -> Self {
        Self {
            id,
            username,
            email,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the contact email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
