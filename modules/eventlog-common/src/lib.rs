pub mod config;
pub mod error;
pub mod event;

pub use config::{BrokerBackend, RelayConfig};
pub use error::RelayError;
pub use event::{LogEvent, NewLogEvent};
