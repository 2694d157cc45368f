use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::RelayError;

/// Which topic transport the relay runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerBackend {
    /// Kafka, via the `kafka` feature of the broker crate.
    Kafka,
    /// In-process channel. Producer and consumer share one process.
    Memory,
}

impl FromStr for BrokerBackend {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kafka" => Ok(Self::Kafka),
            "memory" => Ok(Self::Memory),
            other => Err(RelayError::Config(format!(
                "BROKER must be `kafka` or `memory`, got `{other}`"
            ))),
        }
    }
}

impl fmt::Display for BrokerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kafka => write!(f, "kafka"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// Relay configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    // Durable store
    pub database_url: String,
    pub db_max_connections: u32,

    // Cache list
    pub redis_url: String,
    pub cache_key: String,

    // Topic
    pub broker: BrokerBackend,
    pub kafka_brokers: String,
    pub topic: String,
    pub group_id: String,

    // HTTP
    pub api_host: String,
    pub api_port: u16,
}

impl RelayConfig {
    /// Load from the process environment, after applying any `.env` file.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_settings();
        Ok(config)
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or(RelayError::MissingEnv("DATABASE_URL"))?,
            db_max_connections: parse_number("DB_MAX_CONNECTIONS", &or_default("DB_MAX_CONNECTIONS", "10"))?,
            redis_url: or_default("REDIS_URL", "redis://127.0.0.1:6379"),
            cache_key: or_default("CACHE_KEY", "event_list"),
            broker: or_default("BROKER", "kafka").parse()?,
            kafka_brokers: or_default("KAFKA_BROKERS", "localhost:9092"),
            topic: or_default("KAFKA_TOPIC", "events"),
            group_id: or_default("KAFKA_GROUP_ID", "event-group"),
            api_host: or_default("API_HOST", "0.0.0.0"),
            api_port: parse_number("API_PORT", &or_default("API_PORT", "8080"))?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    fn log_settings(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", redact_url(&self.database_url));
        tracing::info!("  REDIS_URL: {}", redact_url(&self.redis_url));
        tracing::info!("  BROKER: {}", self.broker);
        tracing::info!("  KAFKA_BROKERS: {}", self.kafka_brokers);
        tracing::info!("  KAFKA_TOPIC: {} (group {})", self.topic, self.group_id);
        tracing::info!("  CACHE_KEY: {}", self.cache_key);
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, RelayError> {
    raw.trim()
        .parse()
        .map_err(|_| RelayError::Config(format!("{key} must be a number, got `{raw}`")))
}

/// Hide credentials in a connection URL, keeping scheme and host.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
