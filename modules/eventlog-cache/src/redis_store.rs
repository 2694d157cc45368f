//! Redis-backed lists: `RPUSH` to append, `LRANGE key 0 -1` to read.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use crate::error::Result;
use crate::events::ListStore;

/// List store over one multiplexed Redis connection.
///
/// The connection is cheap to clone; each call works on its own clone.
#[derive(Clone)]
pub struct RedisListStore {
    connection: MultiplexedConnection,
}

impl RedisListStore {
    /// Connect using a `redis://[username:password@]host[:port][/database]` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis");
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ListStore for RedisListStore {
    async fn push(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.connection.clone();
        let _len: i64 = conn.rpush(key, value).await?;
        Ok(())
    }

    async fn range_all(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.connection.clone();
        let values: Vec<String> = conn.lrange(key, 0, -1).await?;
        Ok(values)
    }
}
