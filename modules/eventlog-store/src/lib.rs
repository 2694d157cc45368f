//! Durable store for log events.
//!
//! The consumer persists every delivered event here; the store assigns the
//! identifier. Postgres in production, an in-memory table for tests and the
//! single-process development mode.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::{Result, StoreError};
pub use memory::MemoryEventRepository;
pub use repository::{run_migrations, EventRepository, PgEventRepository};
