use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::events::ListStore;

/// In-process lists keyed by name.
#[derive(Default)]
pub struct MemoryListStore {
    lists: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn push(&self, key: &str, value: String) -> Result<()> {
        self.lists
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .push(value);
        Ok(())
    }

    async fn range_all(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .lists
            .lock()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }
}
