//! Per-request scope handed to service handlers.

use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::cache::CacheSession;
use crate::notification::Notification;
use crate::workspace::domain::UserId;

/// Identifier correlating one request's log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a handler needs to take part in the request's unit of work.
///
/// The scope is created by
/// [`TransactionCoordinator::run`](super::TransactionCoordinator::run) and
/// is only valid until the coordinator commits or rolls back. Storage and
/// cache access go through the session handles it carries, so every write a
/// handler makes joins the same unit of work.
#[derive(Clone)]
pub struct RequestScope<S> {
    request_id: RequestId,
    actor: UserId,
    store: S,
    cache: CacheSession,
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl<S> RequestScope<S> {
    /// Creates a scope from already-opened sessions.
    #[must_use]
    pub fn new(actor: UserId, store: S, cache: CacheSession) -> Self {
        Self {
            request_id: RequestId::new(),
            actor,
            store,
            cache,
            notifications: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the authenticated user issuing the request.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the storage session.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cache session.
    #[must_use]
    pub const fn cache(&self) -> &CacheSession {
        &self.cache
    }

    /// Queues a notification for dispatch after a successful commit.
    pub fn defer_notification(&self, notification: Notification) {
        if let Ok(mut queue) = self.notifications.lock() {
            queue.push(notification);
        }
    }

    /// Returns the number of queued notifications.
    #[must_use]
    pub fn pending_notifications(&self) -> usize {
        self.notifications.lock().map(|queue| queue.len()).unwrap_or(0)
    }

    pub(crate) fn take_notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}
