use thiserror::Error;

use eventlog_cache::CacheError;
use eventlog_store::StoreError;

pub type Result<T> = std::result::Result<T, BrokerError>;

/// Failures talking to the topic.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Topic is closed")]
    Closed,

    #[error("Topic setup failed for {topic}: {reason}")]
    TopicSetup { topic: String, reason: String },

    #[cfg(feature = "kafka")]
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

/// Why a single delivered message could not be fully processed.
#[derive(Debug, Error)]
pub enum ConsumeError {
    #[error("Undecodable payload: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Persist failed: {0}")]
    Persist(#[from] StoreError),

    #[error("Cache append failed: {0}")]
    Cache(#[from] CacheError),
}
