use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Where user-facing failures are surfaced.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Discards everything; for hosts without a notification surface.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps notifications in memory until drained.
#[derive(Debug, Default)]
pub struct QueuedNotifier {
    queue: Mutex<Vec<Notification>>,
}

impl QueuedNotifier {
    pub fn drain(&self) -> Vec<Notification> {
        match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push(notification);
        }
    }
}
