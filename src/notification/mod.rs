//! Notifier collaborator.
//!
//! Delivery is fire-and-forget: services queue notifications on the request
//! scope and the transaction coordinator hands them to a [`Notifier`] only
//! after the request's unit of work has committed.

use crate::workspace::domain::UserId;
use std::sync::{Arc, Mutex};

/// Delivery channel for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationChannel {
    /// Shown inside the application.
    InApp,
    /// Sent to the user's email address.
    Email,
}

/// Outbound message to a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Delivery channel.
    pub channel: NotificationChannel,
    /// Receiving user.
    pub recipient: UserId,
    /// Short summary line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

impl Notification {
    /// Creates an in-app notification.
    #[must_use]
    pub fn in_app(recipient: UserId, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: NotificationChannel::InApp,
            recipient,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Creates an email notification.
    #[must_use]
    pub fn email(recipient: UserId, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: NotificationChannel::Email,
            recipient,
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Fire-and-forget notification sink. Implementations must not block.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Hands a notification to the delivery mechanism.
    fn notify(&self, notification: &Notification);
}

/// Notifier that only records deliveries in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            channel = ?notification.channel,
            recipient = %notification.recipient,
            subject = %notification.subject,
            "notification dispatched"
        );
    }
}

/// Notifier that keeps every notification in memory for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded notification.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut guard) = self.sent.lock() {
            guard.push(notification.clone());
        }
    }
}
