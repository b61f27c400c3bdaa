//! Committer contract and the sequential composite committer.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{TransactionError, TransactionResult};

/// One backing store's share of a request's unit of work.
#[async_trait]
pub trait Committer: Send + Sync {
    /// Short label used in logs and errors.
    fn label(&self) -> &'static str;

    /// Makes the unit of work durable.
    ///
    /// A committer is finished once `commit` returns, whether or not it
    /// succeeded; [`CompositeCommitter`] never rolls back a child whose
    /// commit failed.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Commit`] when the backend rejects the
    /// commit or [`TransactionError::AlreadyFinished`] on reuse.
    async fn commit(&self) -> TransactionResult<()>;

    /// Discards the unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::Rollback`] when the backend fails or
    /// [`TransactionError::AlreadyFinished`] on reuse.
    async fn rollback(&self) -> TransactionResult<()>;
}

/// Fans commit and rollback out to several independent committers.
///
/// Children commit one after another in insertion order. There is no
/// two-phase protocol: when a later child fails, earlier children remain
/// committed and the failure is reported as
/// [`TransactionError::PartialCommit`]. Children that had not committed yet
/// are rolled back.
#[derive(Default)]
pub struct CompositeCommitter {
    children: Vec<Box<dyn Committer>>,
}

impl CompositeCommitter {
    /// Creates a composite with no children.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a child committer.
    #[must_use]
    pub fn with(mut self, child: impl Committer + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` when there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    async fn roll_back_from(&self, start: usize) {
        for child in self.children.iter().skip(start) {
            if let Err(err) = child.rollback().await {
                warn!(committer = child.label(), error = %err, "rollback after failed commit did not complete");
            }
        }
    }
}

#[async_trait]
impl Committer for CompositeCommitter {
    fn label(&self) -> &'static str {
        "composite"
    }

    async fn commit(&self) -> TransactionResult<()> {
        let mut committed = Vec::with_capacity(self.children.len());
        for (index, child) in self.children.iter().enumerate() {
            if let Err(err) = child.commit().await {
                self.roll_back_from(index.saturating_add(1)).await;
                if committed.is_empty() {
                    return Err(err);
                }
                return Err(TransactionError::PartialCommit {
                    committed,
                    failed: child.label(),
                    cause: Arc::new(err),
                });
            }
            debug!(committer = child.label(), "committed");
            committed.push(child.label());
        }
        Ok(())
    }

    async fn rollback(&self) -> TransactionResult<()> {
        let mut first_failure = None;
        for child in &self.children {
            match child.rollback().await {
                Ok(()) => debug!(committer = child.label(), "rolled back"),
                Err(err) => {
                    warn!(committer = child.label(), error = %err, "rollback failed");
                    first_failure.get_or_insert(err);
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Commit(&'static str),
        Rollback(&'static str),
    }

    #[derive(Clone)]
    struct ScriptedCommitter {
        label: &'static str,
        fail_commit: bool,
        events: Arc<Mutex<Vec<Event>>>,
    }

    impl ScriptedCommitter {
        fn new(label: &'static str, fail_commit: bool, events: &Arc<Mutex<Vec<Event>>>) -> Self {
            Self {
                label,
                fail_commit,
                events: events.clone(),
            }
        }
    }

    #[async_trait]
    impl Committer for ScriptedCommitter {
        fn label(&self) -> &'static str {
            self.label
        }

        async fn commit(&self) -> TransactionResult<()> {
            if self.fail_commit {
                return Err(TransactionError::commit(
                    self.label,
                    std::io::Error::other("disk full"),
                ));
            }
            self.events.lock().expect("events").push(Event::Commit(self.label));
            Ok(())
        }

        async fn rollback(&self) -> TransactionResult<()> {
            self.events
                .lock()
                .expect("events")
                .push(Event::Rollback(self.label));
            Ok(())
        }
    }

    fn recorded(events: &Arc<Mutex<Vec<Event>>>) -> Vec<Event> {
        events.lock().expect("events").clone()
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn commits_children_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeCommitter::new()
            .with(ScriptedCommitter::new("store", false, &events))
            .with(ScriptedCommitter::new("cache", false, &events));

        composite.commit().await.expect("commit should succeed");

        assert_eq!(
            recorded(&events),
            vec![Event::Commit("store"), Event::Commit("cache")]
        );
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn later_failure_leaves_earlier_children_committed() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeCommitter::new()
            .with(ScriptedCommitter::new("store", false, &events))
            .with(ScriptedCommitter::new("cache", true, &events))
            .with(ScriptedCommitter::new("search", false, &events));

        let result = composite.commit().await;

        let Err(TransactionError::PartialCommit {
            committed, failed, ..
        }) = result
        else {
            panic!("expected partial commit, got {result:?}");
        };
        assert_eq!(committed, vec!["store"]);
        assert_eq!(failed, "cache");
        assert_eq!(
            recorded(&events),
            vec![Event::Commit("store"), Event::Rollback("search")]
        );
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn first_child_failure_is_reported_unchanged() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeCommitter::new()
            .with(ScriptedCommitter::new("store", true, &events))
            .with(ScriptedCommitter::new("cache", false, &events));

        let result = composite.commit().await;

        assert!(matches!(
            result,
            Err(TransactionError::Commit { label: "store", .. })
        ));
        assert_eq!(recorded(&events), vec![Event::Rollback("cache")]);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn rollback_visits_every_child() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let composite = CompositeCommitter::new()
            .with(ScriptedCommitter::new("store", false, &events))
            .with(ScriptedCommitter::new("cache", false, &events));

        composite.rollback().await.expect("rollback should succeed");

        assert_eq!(
            recorded(&events),
            vec![Event::Rollback("store"), Event::Rollback("cache")]
        );
    }
}
