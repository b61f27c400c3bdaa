//! Error types for request-scoped units of work.

use std::sync::Arc;
use thiserror::Error;

/// Result type for transaction operations.
pub type TransactionResult<T> = Result<T, TransactionError>;

/// Errors raised while opening, committing, or rolling back a unit of work.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    /// An underlying committer could not be opened.
    #[error("failed to begin {label} unit of work: {cause}")]
    Begin {
        /// Committer label.
        label: &'static str,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A committer failed before anything was made durable.
    #[error("{label} commit failed: {cause}")]
    Commit {
        /// Committer label.
        label: &'static str,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A later committer failed after earlier ones had already committed.
    ///
    /// The composite commit is sequential, so the committed children stay
    /// committed and cannot be undone.
    #[error("{failed} commit failed after {committed:?} committed: {cause}")]
    PartialCommit {
        /// Labels of the children that committed.
        committed: Vec<&'static str>,
        /// Label of the child that failed.
        failed: &'static str,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A committer failed to roll back.
    #[error("{label} rollback failed: {cause}")]
    Rollback {
        /// Committer label.
        label: &'static str,
        /// Underlying failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The unit of work was already committed or rolled back.
    #[error("{0} unit of work already finished")]
    AlreadyFinished(&'static str),
}

impl TransactionError {
    /// Wraps a failure to open a committer.
    pub fn begin(label: &'static str, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Begin {
            label,
            cause: Arc::new(err),
        }
    }

    /// Wraps a commit failure.
    pub fn commit(label: &'static str, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Commit {
            label,
            cause: Arc::new(err),
        }
    }

    /// Wraps a rollback failure.
    pub fn rollback(
        label: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Rollback {
            label,
            cause: Arc::new(err),
        }
    }
}
