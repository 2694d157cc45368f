//! Cache list for log events.
//!
//! Events are appended as JSON strings to the tail of one fixed-key list and
//! read back with a full-range query. Nothing is ever evicted.

pub mod error;
pub mod events;
pub mod memory;
pub mod redis_store;

pub use error::{CacheError, Result};
pub use events::{EventCache, ListStore};
pub use memory::MemoryListStore;
pub use redis_store::RedisListStore;
