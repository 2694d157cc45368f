//! EventConsumer: persist, then cache-through.
//!
//! Each delivered message is decoded, saved to the durable store (which
//! assigns its id) and appended to the cache list. There is no transaction
//! across the two writes: a crash between them leaves the event stored but
//! not cached.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use eventlog_cache::{CacheError, EventCache};
use eventlog_common::LogEvent;
use eventlog_store::EventRepository;

use crate::error::ConsumeError;
use crate::topic::TopicSubscription;

/// Persist-then-cache for a single delivered message.
#[derive(Clone)]
pub struct CacheThrough {
    repository: Arc<dyn EventRepository>,
    cache: EventCache,
}

impl CacheThrough {
    pub fn new(repository: Arc<dyn EventRepository>, cache: EventCache) -> Self {
        Self { repository, cache }
    }

    /// Process one message payload. Returns the persisted event.
    ///
    /// A failed save aborts before the cache step. A cache encode failure is
    /// logged and swallowed; the event stays persisted.
    pub async fn handle_payload(&self, payload: &[u8]) -> Result<LogEvent, ConsumeError> {
        let event: LogEvent = serde_json::from_slice(payload).map_err(ConsumeError::Decode)?;

        let saved = self.repository.save(event).await?;

        match self.cache.push(&saved).await {
            Ok(()) => {}
            Err(CacheError::Encode(e)) => {
                warn!(error = %e, id = ?saved.id(), "Failed to encode event for cache, persisted only");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(saved)
    }
}

/// Serial consumer loop over one topic subscription.
pub struct EventConsumer {
    subscription: Box<dyn TopicSubscription>,
    handler: CacheThrough,
}

impl EventConsumer {
    pub fn new(
        subscription: Box<dyn TopicSubscription>,
        repository: Arc<dyn EventRepository>,
        cache: EventCache,
    ) -> Self {
        Self {
            subscription,
            handler: CacheThrough::new(repository, cache),
        }
    }

    /// Consume until the subscription closes, one message at a time.
    pub async fn run(self) {
        let Self {
            mut subscription,
            handler,
        } = self;

        info!(cache_key = handler.cache.key(), "Event consumer started");

        while let Some(delivery) = subscription.next().await {
            let payload = match delivery {
                Ok(payload) => payload,
                Err(e) => {
                    error!(error = %e, "Failed to receive from topic");
                    continue;
                }
            };

            match handler.handle_payload(&payload).await {
                Ok(event) => debug!(id = ?event.id(), "Event consumed"),
                Err(e) => error!(error = %e, "Failed to process event"),
            }

            if let Err(e) = subscription.ack().await {
                warn!(error = %e, "Failed to acknowledge message");
            }
        }

        info!("Event consumer stopped: topic closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::memory_topic;
    use crate::producer::EventProducer;
    use crate::topic::TopicSink;
    use async_trait::async_trait;
    use chrono::Utc;
    use eventlog_cache::{ListStore, MemoryListStore};
    use eventlog_store::{MemoryEventRepository, StoreError};

    struct Harness {
        repository: Arc<MemoryEventRepository>,
        store: Arc<MemoryListStore>,
        cache: EventCache,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryListStore::new());
        Harness {
            repository: Arc::new(MemoryEventRepository::new()),
            cache: EventCache::new(store.clone(), "event_list"),
            store,
        }
    }

    /// Repository whose every save fails.
    struct FailingRepository;

    #[async_trait]
    impl EventRepository for FailingRepository {
        async fn save(&self, _event: LogEvent) -> eventlog_store::Result<LogEvent> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn find_by_id(&self, _id: i64) -> eventlog_store::Result<Option<LogEvent>> {
            Ok(None)
        }

        async fn find_all(&self) -> eventlog_store::Result<Vec<LogEvent>> {
            Ok(Vec::new())
        }

        async fn count(&self) -> eventlog_store::Result<i64> {
            Ok(0)
        }
    }

    /// List store that is unreachable for both writes and reads.
    struct DownStore;

    #[async_trait]
    impl ListStore for DownStore {
        async fn push(&self, _key: &str, _value: String) -> eventlog_cache::Result<()> {
            Err(redis_down())
        }

        async fn range_all(&self, _key: &str) -> eventlog_cache::Result<Vec<String>> {
            Err(redis_down())
        }
    }

    fn redis_down() -> CacheError {
        CacheError::Backend(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }

    #[tokio::test]
    async fn handle_payload_persists_then_caches() {
        let h = harness();
        let consumer = CacheThrough::new(h.repository.clone(), h.cache.clone());

        let payload = serde_json::to_vec(&LogEvent::new("test-1", Utc::now())).unwrap();
        let saved = consumer.handle_payload(&payload).await.unwrap();

        assert_eq!(saved.id(), Some(1));
        assert_eq!(h.repository.count().await.unwrap(), 1);
        assert_eq!(h.cache.list().await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn undecodable_payload_touches_nothing() {
        let h = harness();
        let consumer = CacheThrough::new(h.repository.clone(), h.cache.clone());

        let err = consumer.handle_payload(b"{oops").await.unwrap_err();

        assert!(matches!(err, ConsumeError::Decode(_)));
        assert_eq!(h.repository.count().await.unwrap(), 0);
        assert!(h.store.range_all("event_list").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_persist_skips_the_cache() {
        let h = harness();
        let consumer = CacheThrough::new(Arc::new(FailingRepository), h.cache.clone());

        let payload = serde_json::to_vec(&LogEvent::new("lost", Utc::now())).unwrap();
        let err = consumer.handle_payload(&payload).await.unwrap_err();

        assert!(matches!(err, ConsumeError::Persist(_)));
        assert!(h.cache.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cache_outage_keeps_the_persisted_event() {
        let repository = Arc::new(MemoryEventRepository::new());
        let cache = EventCache::new(Arc::new(DownStore), "event_list");
        let consumer = CacheThrough::new(repository.clone(), cache);

        let payload = serde_json::to_vec(&LogEvent::new("stored only", Utc::now())).unwrap();
        let err = consumer.handle_payload(&payload).await.unwrap_err();

        assert!(matches!(err, ConsumeError::Cache(CacheError::Backend(_))));
        assert_eq!(repository.count().await.unwrap(), 1);
        let stored = repository.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored.message(), "stored only");
    }

    #[tokio::test]
    async fn run_keeps_consuming_through_a_cache_outage() {
        let repository = Arc::new(MemoryEventRepository::new());
        let cache = EventCache::new(Arc::new(DownStore), "event_list");
        let (sink, sub) = memory_topic();
        let producer = EventProducer::new(Arc::new(sink));

        for message in ["test-1", "test-2", "test-3"] {
            producer.publish(&LogEvent::new(message, Utc::now())).unwrap();
        }
        drop(producer);

        EventConsumer::new(Box::new(sub), repository.clone(), cache)
            .run()
            .await;

        let messages: Vec<String> = repository
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|e| e.message().to_string())
            .collect();
        assert_eq!(messages, vec!["test-1", "test-2", "test-3"]);
    }

    #[tokio::test]
    async fn run_processes_in_publish_order_and_skips_bad_messages() {
        let h = harness();
        let (sink, sub) = memory_topic();
        let producer = EventProducer::new(Arc::new(sink.clone()));

        producer.publish(&LogEvent::new("test-1", Utc::now())).unwrap();
        sink.enqueue(b"not an event".to_vec()).unwrap();
        producer.publish(&LogEvent::new("test-2", Utc::now())).unwrap();
        drop(producer);
        drop(sink);

        EventConsumer::new(Box::new(sub), h.repository.clone(), h.cache.clone())
            .run()
            .await;

        let cached = h.cache.list().await.unwrap();
        let summary: Vec<(Option<i64>, &str)> =
            cached.iter().map(|e| (e.id(), e.message())).collect();
        assert_eq!(summary, vec![(Some(1), "test-1"), (Some(2), "test-2")]);
        assert_eq!(h.repository.count().await.unwrap(), 2);
    }
}
