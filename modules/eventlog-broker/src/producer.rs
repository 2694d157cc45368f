use std::sync::Arc;

use tracing::debug;

use eventlog_common::LogEvent;

use crate::error::{BrokerError, Result};
use crate::topic::TopicSink;

/// Publishes accepted events to the topic as JSON.
#[derive(Clone)]
pub struct EventProducer {
    sink: Arc<dyn TopicSink>,
}

impl EventProducer {
    pub fn new(sink: Arc<dyn TopicSink>) -> Self {
        Self { sink }
    }

    /// Fire-and-forget: returns once the event is queued for the topic.
    pub fn publish(&self, event: &LogEvent) -> Result<()> {
        let payload = serde_json::to_vec(event).map_err(BrokerError::Encode)?;
        self.sink.enqueue(payload)?;
        debug!(timestamp = %event.timestamp(), "Event published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::memory_topic;
    use crate::topic::TopicSubscription;
    use chrono::Utc;

    #[tokio::test]
    async fn publish_writes_the_event_as_json() {
        let (sink, mut sub) = memory_topic();
        let producer = EventProducer::new(Arc::new(sink));
        let event = LogEvent::new("test-1", Utc::now());

        producer.publish(&event).unwrap();

        let payload = sub.next().await.unwrap().unwrap();
        let decoded: LogEvent = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, event);
        assert!(decoded.id().is_none());
    }
}
