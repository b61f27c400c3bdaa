//! User registration and lookup.

use tracing::debug;

use super::{WorkspaceError, WorkspaceResult};
use crate::transaction::RequestScope;
use crate::workspace::domain::{User, UserId};
use crate::workspace::ports::WorkspaceSession;

/// Stores and looks up users. Authentication lives outside this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserService;

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Domain`] for a blank username or a
    /// malformed email address.
    pub async fn register<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        username: &str,
        email: &str,
    ) -> WorkspaceResult<User> {
        let user = User::new(username, email)?;
        scope.store().store_user(&user).await?;
        debug!(user_id = %user.id(), "user registered");
        Ok(user)
    }

    /// Returns a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::UserNotFound`] for unknown users.
    pub async fn get_user<S: WorkspaceSession>(
        &self,
        scope: &RequestScope<S>,
        user_id: UserId,
    ) -> WorkspaceResult<User> {
        scope
            .store()
            .find_user(user_id)
            .await?
            .ok_or(WorkspaceError::UserNotFound(user_id))
    }
}
