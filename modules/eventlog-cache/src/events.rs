use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use eventlog_common::LogEvent;

use crate::error::{CacheError, Result};

/// An ordered list of strings under a key, appended at the tail.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Append `value` to the tail of the list at `key`.
    async fn push(&self, key: &str, value: String) -> Result<()>;

    /// The whole list at `key`, head first. A missing key is an empty list.
    async fn range_all(&self, key: &str) -> Result<Vec<String>>;
}

/// The event list: JSON-encoded events under one fixed key.
#[derive(Clone)]
pub struct EventCache {
    store: Arc<dyn ListStore>,
    key: String,
}

impl EventCache {
    pub fn new(store: Arc<dyn ListStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Encode the event and append it to the tail of the list.
    pub async fn push(&self, event: &LogEvent) -> Result<()> {
        let json = serde_json::to_string(event).map_err(CacheError::Encode)?;
        self.store.push(&self.key, json).await
    }

    /// Every cached event in append order. Entries that don't decode are skipped.
    pub async fn list(&self) -> Result<Vec<LogEvent>> {
        let entries = self.store.range_all(&self.key).await?;
        Ok(decode_entries(&self.key, &entries))
    }
}

fn decode_entries(key: &str, entries: &[String]) -> Vec<LogEvent> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_str::<LogEvent>(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, key, index, "Skipping undecodable cache entry");
                None
            }
        })
        .collect()
}
