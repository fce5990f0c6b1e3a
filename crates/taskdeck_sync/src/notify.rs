//! User-facing notifications.
//!
//! Every intent reports its outcome through a [`Notifier`]. How a
//! notification reaches the user (toast, status line, log) is up to the
//! implementation.

use parking_lot::Mutex;
use std::sync::Arc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// The intent succeeded.
    Success,
    /// The intent failed.
    Error,
}

/// A human-readable outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Short title.
    pub title: String,
    /// Message body.
    pub description: String,
}

impl Notification {
    /// A success notification.
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Success".into(),
            description: description.into(),
        }
    }

    /// An error notification.
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Error".into(),
            description: description.into(),
        }
    }

    /// Returns true for error notifications.
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Delivers notifications to the user.
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Routes notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(title = %notification.title, "{}", notification.description)
            }
            NotificationLevel::Error => {
                tracing::warn!(title = %notification.title, "{}", notification.description)
            }
        }
    }
}

/// Keeps every notification in memory, for tests and headless callers.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<Notification> {
        self.entries.lock().last().cloned()
    }

    /// Number of error notifications.
    pub fn error_count(&self) -> usize {
        self.entries.lock().iter().filter(|n| n.is_error()).count()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.entries.lock().push(notification);
    }
}
