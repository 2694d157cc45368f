//! Single-process topic over an unbounded channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{BrokerError, Result};
use crate::topic::{TopicSink, TopicSubscription};

/// Create a connected sink/subscription pair. The subscription ends once every
/// clone of the sink has been dropped and the backlog is drained.
pub fn memory_topic() -> (MemorySink, MemorySubscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MemorySink { tx }, MemorySubscription { rx })
}

#[derive(Clone)]
pub struct MemorySink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl TopicSink for MemorySink {
    fn enqueue(&self, payload: Vec<u8>) -> Result<()> {
        self.tx.send(payload).map_err(|_| BrokerError::Closed)
    }
}

pub struct MemorySubscription {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl TopicSubscription for MemorySubscription {
    async fn next(&mut self) -> Option<Result<Vec<u8>>> {
        self.rx.recv().await.map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_enqueue_order() {
        let (sink, mut sub) = memory_topic();
        sink.enqueue(b"one".to_vec()).unwrap();
        sink.enqueue(b"two".to_vec()).unwrap();
        drop(sink);

        assert_eq!(sub.next().await.unwrap().unwrap(), b"one");
        assert_eq!(sub.next().await.unwrap().unwrap(), b"two");
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn enqueue_after_subscription_dropped_is_closed() {
        let (sink, sub) = memory_topic();
        drop(sub);
        assert!(matches!(sink.enqueue(b"late".to_vec()), Err(BrokerError::Closed)));
    }
}
