//! Request-level commit/rollback decisions.

use std::future::Future;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};

use super::{Committer, CompositeCommitter, RequestScope, TransactionError};
use crate::cache::{Cache, CacheSession};
use crate::notification::Notifier;
use crate::workspace::domain::UserId;
use crate::workspace::ports::WorkspaceStore;

const STORE_LABEL: &str = "store";

/// What a handler wants done with its unit of work.
///
/// Both variants carry the handler's response value. `Failure` lets a
/// handler return a normal response while still discarding every write it
/// made, which is how "respond, but do not persist" outcomes are expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome<T> {
    /// Commit the unit of work.
    Success(T),
    /// Roll the unit of work back.
    Failure(T),
}

impl<T> HandlerOutcome<T> {
    /// Returns `true` for [`HandlerOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Unwraps the carried value regardless of the outcome.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Success(value) | Self::Failure(value) => value,
        }
    }
}

/// Opens request scopes and decides whether they commit.
pub struct TransactionCoordinator<S: WorkspaceStore> {
    store: Arc<S>,
    cache: Arc<dyn Cache>,
    notifier: Arc<dyn Notifier>,
}

impl<S: WorkspaceStore> Clone for TransactionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S: WorkspaceStore> TransactionCoordinator<S> {
    /// Creates a coordinator over the shared store, cache, and notifier.
    #[must_use]
    pub fn new(store: Arc<S>, cache: Arc<dyn Cache>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            cache,
            notifier,
        }
    }

    /// Returns the shared store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the shared cache backend.
    #[must_use]
    pub const fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Opens a scope without running a handler.
    ///
    /// The caller owns the returned committer and must commit or roll it
    /// back. The committer finishes the storage session first and the
    /// cache session second.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Begin`] when the storage session cannot
    /// be opened.
    pub async fn begin(
        &self,
        actor: UserId,
    ) -> Result<(RequestScope<S::Session>, CompositeCommitter), TransactionError> {
        let session = self
            .store
            .begin()
            .await
            .map_err(|err| TransactionError::begin(STORE_LABEL, err))?;
        let cache = CacheSession::new(Arc::clone(&self.cache));
        let committer = CompositeCommitter::new()
            .with(session.clone())
            .with(cache.clone());
        Ok((RequestScope::new(actor, session, cache), committer))
    }

    /// Runs `handler` inside a fresh unit of work.
    ///
    /// - `Ok(Success(v))` commits, then dispatches deferred notifications
    ///   and returns `Ok(v)`. A commit failure is returned instead.
    /// - `Ok(Failure(v))` rolls back without attempting a commit and
    ///   returns `Ok(v)`.
    /// - `Err(e)` rolls back and returns `Err(e)`.
    ///
    /// Rollback failures are logged and never replace the handler's result.
    ///
    /// # Errors
    ///
    /// Returns the handler's error, or a [`TransactionError`] converted into
    /// `E` when the scope cannot be opened or committed.
    pub async fn run<T, E, F, Fut>(&self, actor: UserId, handler: F) -> Result<T, E>
    where
        F: FnOnce(RequestScope<S::Session>) -> Fut,
        Fut: Future<Output = Result<HandlerOutcome<T>, E>>,
        E: From<TransactionError>,
    {
        let (scope, committer) = self.begin(actor).await?;
        let span = info_span!(
            "request",
            request_id = %scope.request_id(),
            actor = %actor,
        );
        let pending = scope.clone();

        async move {
            match handler(scope).await {
                Ok(HandlerOutcome::Success(value)) => match committer.commit().await {
                    Ok(()) => {
                        debug!("unit of work committed");
                        self.dispatch(&pending);
                        Ok(value)
                    }
                    Err(err) => {
                        error!(error = %err, "unit of work failed to commit");
                        Err(E::from(err))
                    }
                },
                Ok(HandlerOutcome::Failure(value)) => {
                    Self::roll_back(&committer, "handler signalled failure").await;
                    Ok(value)
                }
                Err(err) => {
                    Self::roll_back(&committer, "handler returned an error").await;
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn roll_back(committer: &CompositeCommitter, reason: &'static str) {
        match committer.rollback().await {
            Ok(()) => debug!(reason, "unit of work rolled back"),
            Err(err) => warn!(reason, error = %err, "unit of work rollback failed"),
        }
    }

    fn dispatch(&self, scope: &RequestScope<S::Session>) {
        for notification in scope.take_notifications() {
            self.notifier.notify(&notification);
        }
    }
}
