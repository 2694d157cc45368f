use async_trait::async_trait;
use tokio::sync::Mutex;

use eventlog_common::LogEvent;

use crate::error::Result;
use crate::repository::EventRepository;

/// In-process table. Ids start at 1 and increase by one per save.
#[derive(Default)]
pub struct MemoryEventRepository {
    rows: Mutex<Vec<LogEvent>>,
}

impl MemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryEventRepository {
    async fn save(&self, event: LogEvent) -> Result<LogEvent> {
        let mut rows = self.rows.lock().await;
        let id = rows.len() as i64 + 1;
        let saved = LogEvent::persisted(id, event.message(), event.timestamp());
        rows.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LogEvent>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|e| e.id() == Some(id)).cloned())
    }

    async fn find_all(&self) -> Result<Vec<LogEvent>> {
        Ok(self.rows.lock().await.clone())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.lock().await.len() as i64)
    }
}
