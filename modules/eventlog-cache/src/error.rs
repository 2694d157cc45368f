use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Redis error: {0}")]
    Backend(#[from] redis::RedisError),
}
