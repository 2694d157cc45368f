//! Topic plumbing for the relay: the producer that publishes accepted events
//! and the consumer that persists them and appends them to the cache list.
//!
//! Transports sit behind [`TopicSink`] / [`TopicSubscription`]. The in-memory
//! topic is always available; Kafka needs the `kafka` feature.

pub mod consumer;
pub mod error;
#[cfg(feature = "kafka")]
pub mod kafka;
pub mod memory;
pub mod producer;
pub mod topic;

pub use consumer::{CacheThrough, EventConsumer};
pub use error::{BrokerError, ConsumeError, Result};
#[cfg(feature = "kafka")]
pub use kafka::{ensure_topic, KafkaSink, KafkaSubscription};
pub use memory::{memory_topic, MemorySink, MemorySubscription};
pub use producer::EventProducer;
pub use topic::{TopicSink, TopicSubscription};
