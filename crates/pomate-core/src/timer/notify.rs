use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    WorkDone,
    BreakDone,
}

/// A user-facing alert raised when a countdown completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub category: NotificationCategory,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn work_done() -> Self {
        Self {
            category: NotificationCategory::WorkDone,
            title: "Work session completed!".into(),
            body: "Time for a break.".into(),
        }
    }

    pub fn break_done() -> Self {
        Self {
            category: NotificationCategory::BreakDone,
            title: "Break completed!".into(),
            body: "Time to get back to work.".into(),
        }
    }
}

/// Delivers notifications. Fire-and-forget: the engine ignores the outcome.
pub trait Notifier: Send {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            category = ?notification.category,
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
    }
}

/// Keeps every notification it receives. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
    }
}
