//! Kafka transport (librdkafka via `rdkafka`).
//!
//! One topic, one partition, replication factor 1. Offsets are stored only
//! after the consumer has handled a message and committed by the client's
//! auto-commit, giving at-least-once delivery.

use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use tracing::{debug, info, warn};

use crate::error::{BrokerError, Result};
use crate::topic::{TopicSink, TopicSubscription};

/// Create `topic` with one partition and one replica if it doesn't exist yet.
pub async fn ensure_topic(brokers: &str, topic: &str) -> Result<()> {
    let admin: AdminClient<DefaultClientContext> = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .create()?;

    let new_topic = NewTopic::new(topic, 1, TopicReplication::Fixed(1));
    let results = admin
        .create_topics(&[new_topic], &AdminOptions::new())
        .await?;

    for result in results {
        match result {
            Ok(name) => info!(topic = %name, "Created topic"),
            Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                debug!(topic = %name, "Topic already exists")
            }
            Err((name, code)) => {
                return Err(BrokerError::TopicSetup {
                    topic: name,
                    reason: code.to_string(),
                })
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// KafkaSink
// ---------------------------------------------------------------------------

pub struct KafkaSink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaSink {
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "30000")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.into(),
        })
    }
}

impl TopicSink for KafkaSink {
    fn enqueue(&self, payload: Vec<u8>) -> Result<()> {
        let record = FutureRecord::<(), [u8]>::to(&self.topic).payload(&payload);
        let delivery = self
            .producer
            .send_result(record)
            .map_err(|(e, _)| BrokerError::Kafka(e))?;

        let topic = self.topic.clone();
        tokio::spawn(async move {
            match delivery.await {
                Ok(Ok(_)) => debug!(topic, "Delivered to Kafka"),
                Ok(Err((e, _))) => warn!(error = %e, topic, "Kafka delivery failed"),
                Err(_) => warn!(topic, "Kafka delivery report dropped"),
            }
        });

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// KafkaSubscription
// ---------------------------------------------------------------------------

pub struct KafkaSubscription {
    consumer: StreamConsumer,
    /// (topic, partition, offset) of the last message handed out.
    pending: Option<(String, i32, i64)>,
}

impl KafkaSubscription {
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set("enable.partition.eof", "false")
            .create()?;

        consumer.subscribe(&[topic])?;
        info!(topic, group_id, "Subscribed to Kafka topic");

        Ok(Self {
            consumer,
            pending: None,
        })
    }
}

#[async_trait]
impl TopicSubscription for KafkaSubscription {
    async fn next(&mut self) -> Option<Result<Vec<u8>>> {
        match self.consumer.recv().await {
            Ok(message) => {
                self.pending = Some((
                    message.topic().to_string(),
                    message.partition(),
                    message.offset(),
                ));
                Some(Ok(message.payload().map(<[u8]>::to_vec).unwrap_or_default()))
            }
            Err(e) => Some(Err(e.into())),
        }
    }

    async fn ack(&mut self) -> Result<()> {
        if let Some((topic, partition, offset)) = self.pending.take() {
            self.consumer.store_offset(&topic, partition, offset)?;
        }
        Ok(())
    }
}
