//! Integration tests for RedisListStore.
//! Requires a Redis instance. Set REDIS_TEST_URL or these tests are skipped.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use eventlog_cache::{EventCache, ListStore, RedisListStore};
use eventlog_common::LogEvent;

/// Connect and clear `key`, or skip if no test Redis is available.
async fn test_store(key: &str) -> Option<RedisListStore> {
    let url = std::env::var("REDIS_TEST_URL").ok()?;
    let client = redis::Client::open(url.as_str()).ok()?;
    let mut conn = client.get_multiplexed_async_connection().await.ok()?;

    let _: i64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await.ok()?;

    Some(RedisListStore::from_connection(conn))
}

#[tokio::test]
async fn missing_key_reads_as_empty_list() {
    let key = "eventlog_test:missing";
    let Some(store) = test_store(key).await else {
        return;
    };

    assert!(store.range_all(key).await.unwrap().is_empty());
}

#[tokio::test]
async fn push_appends_to_the_tail() {
    let key = "eventlog_test:tail";
    let Some(store) = test_store(key).await else {
        return;
    };

    store.push(key, "first".to_string()).await.unwrap();
    store.push(key, "second".to_string()).await.unwrap();

    assert_eq!(store.range_all(key).await.unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn event_cache_skips_garbage_written_by_other_clients() {
    let key = "eventlog_test:garbage";
    let Some(store) = test_store(key).await else {
        return;
    };
    let store = Arc::new(store);
    let cache = EventCache::new(store.clone(), key);
    let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    cache.push(&LogEvent::persisted(1, "test-1", ts)).await.unwrap();
    store.push(key, "not-json".to_string()).await.unwrap();
    cache.push(&LogEvent::persisted(2, "test-2", ts)).await.unwrap();

    let events = cache.list().await.unwrap();
    assert_eq!(
        events,
        vec![
            LogEvent::persisted(1, "test-1", ts),
            LogEvent::persisted(2, "test-2", ts),
        ]
    );
}
