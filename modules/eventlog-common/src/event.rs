//! The log event record shared by every stage of the relay.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A log event as it travels from ingress, through the topic, into the
/// durable store and the cache list.
///
/// `id` stays `None` until the durable store assigns one. `message` and
/// `timestamp` are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    id: Option<i64>,
    message: String,
    timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// A fresh, not-yet-persisted event.
    pub fn new(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            message: message.into(),
            timestamp,
        }
    }

    /// An event carrying the id the durable store assigned to it.
    pub fn persisted(id: i64, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            message: message.into(),
            timestamp,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "LogEvent{{id={}, message='{}', timestamp={}}}",
            id,
            self.message,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Ingress request body. Only `message` is taken from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLogEvent {
    pub message: String,
}

impl NewLogEvent {
    /// Stamp the event with the ingress time.
    pub fn into_event(self, now: DateTime<Utc>) -> LogEvent {
        LogEvent::new(self.message, now)
    }
}
