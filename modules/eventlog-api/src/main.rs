use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use eventlog_api::{routes, AppState};
use eventlog_broker::{memory_topic, EventConsumer, EventProducer, TopicSink, TopicSubscription};
use eventlog_cache::{EventCache, RedisListStore};
use eventlog_common::{BrokerBackend, RelayConfig};
use eventlog_store::{EventRepository, PgEventRepository};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = RelayConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    eventlog_store::run_migrations(&pool).await?;
    info!("Connected to database, migrations complete");

    let repository: Arc<dyn EventRepository> = Arc::new(PgEventRepository::new(pool));

    let list_store = RedisListStore::connect(&config.redis_url)
        .await
        .context("Failed to connect to Redis")?;
    let cache = EventCache::new(Arc::new(list_store), config.cache_key.clone());

    let (sink, subscription) = open_topic(&config).await?;

    let consumer = EventConsumer::new(subscription, repository, cache.clone());
    let consumer_task = tokio::spawn(consumer.run());

    let state = Arc::new(AppState::new(EventProducer::new(sink), cache));
    let app = routes::build_router(state);

    let addr = config.bind_addr();
    info!("Event relay listening on {addr} (broker: {})", config.broker);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    consumer_task.abort();
    info!("Event relay stopped");

    Ok(())
}

/// Used when `RUST_LOG` is unset. `tower_http` carries the request traces.
const DEFAULT_LOG_FILTER: &str = "eventlog=info,tower_http=info";

/// `RUST_LOG` filters (default [`DEFAULT_LOG_FILTER`]); `LOG_FORMAT=json` for JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

type Topic = (Arc<dyn TopicSink>, Box<dyn TopicSubscription>);

async fn open_topic(config: &RelayConfig) -> Result<Topic> {
    match config.broker {
        BrokerBackend::Memory => {
            let (sink, subscription) = memory_topic();
            let sink: Arc<dyn TopicSink> = Arc::new(sink);
            let subscription: Box<dyn TopicSubscription> = Box::new(subscription);
            Ok((sink, subscription))
        }
        BrokerBackend::Kafka => open_kafka_topic(config).await,
    }
}

#[cfg(feature = "kafka")]
async fn open_kafka_topic(config: &RelayConfig) -> Result<Topic> {
    use eventlog_broker::{ensure_topic, KafkaSink, KafkaSubscription};

    ensure_topic(&config.kafka_brokers, &config.topic)
        .await
        .context("Failed to provision Kafka topic")?;

    let sink: Arc<dyn TopicSink> =
        Arc::new(KafkaSink::new(&config.kafka_brokers, config.topic.clone())?);
    let subscription: Box<dyn TopicSubscription> = Box::new(KafkaSubscription::new(
        &config.kafka_brokers,
        &config.group_id,
        &config.topic,
    )?);

    Ok((sink, subscription))
}

#[cfg(not(feature = "kafka"))]
async fn open_kafka_topic(_config: &RelayConfig) -> Result<Topic> {
    anyhow::bail!(
        "BROKER=kafka needs eventlog-api built with `--features kafka`; \
         set BROKER=memory to run producer and consumer in-process"
    )
}
