pub mod rest;
pub mod routes;

use eventlog_broker::EventProducer;
use eventlog_cache::EventCache;

/// Handles shared by every request: the write path goes to the producer, the
/// read path to the cache list.
pub struct AppState {
    pub producer: EventProducer,
    pub cache: EventCache,
}

impl AppState {
    pub fn new(producer: EventProducer, cache: EventCache) -> Self {
        Self { producer, cache }
    }
}
