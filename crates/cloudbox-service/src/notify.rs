//! Non-blocking user notifications.
//!
//! Operation failures never propagate past the workspace boundary; they are
//! turned into a [`Notification`] and handed to a [`Notifier`].

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cloudbox_core::error::AppError;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// An operation completed.
    Success,
    /// Informational.
    Info,
    /// Something degraded but the user can continue.
    Warning,
    /// An operation failed.
    Error,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
    /// When the notification was raised.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a notification stamped with the current time.
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    /// Success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    /// Warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    /// Error notification carrying the error's user-facing text.
    pub fn from_error(err: &AppError) -> Self {
        Self::new(NotificationLevel::Error, err.user_message())
    }
}

/// Sink for user notifications.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Deliver a notification. Must not block.
    fn notify(&self, notification: Notification);
}

/// Keeps notifications in memory so a front-end (or a test) can drain them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every notification raised so far.
    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Take every pending notification.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// The most recent notification, if any.
    pub fn last(&self) -> Option<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_drain() {
        let notifier = MemoryNotifier::new();
        notifier.notify(Notification::success("Folder created"));
        notifier.notify(Notification::from_error(&AppError::validation(
            "Please select a file",
        )));

        assert_eq!(notifier.last().map(|n| n.level), Some(NotificationLevel::Error));
        let drained = notifier.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "Folder created");
        assert!(notifier.entries().is_empty());
    }
}
