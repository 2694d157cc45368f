//! EventRepository: the relational table behind the relay.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use eventlog_common::LogEvent;

use crate::error::Result;

/// Persistence for log events. Ids are assigned by the store on `save`.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert the event and return it with its assigned id.
    async fn save(&self, event: LogEvent) -> Result<LogEvent>;

    async fn find_by_id(&self, id: i64) -> Result<Option<LogEvent>>;

    /// Every stored event, oldest id first.
    async fn find_all(&self) -> Result<Vec<LogEvent>>;

    async fn count(&self) -> Result<i64>;
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// PgEventRepository
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: i64,
    message: String,
    timestamp: DateTime<Utc>,
}

impl From<EventRow> for LogEvent {
    fn from(row: EventRow) -> Self {
        LogEvent::persisted(row.id, row.message, row.timestamp)
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn save(&self, event: LogEvent) -> Result<LogEvent> {
        let (id,) = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO events (message, "timestamp")
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(event.message())
        .bind(event.timestamp())
        .fetch_one(&self.pool)
        .await?;

        debug!(id, "Event persisted");
        Ok(LogEvent::persisted(id, event.message(), event.timestamp()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LogEvent>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, message, "timestamp"
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LogEvent::from))
    }

    async fn find_all(&self) -> Result<Vec<LogEvent>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, message, "timestamp"
            FROM events
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LogEvent::from).collect())
    }

    async fn count(&self) -> Result<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
