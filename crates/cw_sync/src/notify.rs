//! User-facing notifications
//!
//! Every notification is mirrored to `tracing` at a matching level and then
//! broadcast to subscribers. Publishing with no subscriber is fine.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn publish(&self, level: NotifyLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotifyLevel::Info | NotifyLevel::Success => tracing::info!("{}", message),
            NotifyLevel::Warning => tracing::warn!("{}", message),
            NotifyLevel::Error => tracing::error!("{}", message),
        }

        let _ = self.tx.send(Notification {
            level,
            message,
            timestamp: Utc::now(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(NotifyLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NotifyLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.publish(NotifyLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NotifyLevel::Error, message);
    }
}
