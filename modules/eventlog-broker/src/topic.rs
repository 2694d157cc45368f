use async_trait::async_trait;

use crate::error::Result;

/// Write side of a topic.
pub trait TopicSink: Send + Sync {
    /// Queue `payload` for the topic. Returns once it is queued; delivery
    /// happens in the background and its failures are only logged.
    fn enqueue(&self, payload: Vec<u8>) -> Result<()>;
}

/// Read side of a topic, for one consumer processing messages in order.
#[async_trait]
pub trait TopicSubscription: Send {
    /// The next message payload. `None` once the topic is closed.
    async fn next(&mut self) -> Option<Result<Vec<u8>>>;

    /// Mark the last message returned by `next` as processed.
    async fn ack(&mut self) -> Result<()> {
        Ok(())
    }
}
