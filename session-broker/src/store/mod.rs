use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod memory;
pub mod redis;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Key-value store trait defining the interface for all store implementations.
///
/// Every operation is atomic for a single key. Values are opaque strings;
/// typing and serialization live one layer up in the record store.
///
/// Implementations must be thread-safe (Send + Sync) so a single handle can
/// be shared by every request handler.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Retrieve a value
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value, overwriting any previous one. With a `ttl` the entry
    /// becomes unreadable once it elapses.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>)
        -> Result<(), StoreError>;

    /// Read and delete a value in one step. Of several concurrent callers
    /// for the same key, at most one receives the value.
    async fn take(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Performs a health check on the store backend.
    ///
    /// For Redis, this will ping the server. The in-memory store is always
    /// healthy.
    async fn health_check(&self) -> Result<(), String>;
}

/// Factory function to create the configured store implementation.
///
/// # Example
///
/// ```ignore
/// let config = BrokerConfig::new().expect("Failed to load configuration");
/// let store = create_store(&config.store).await.expect("Failed to create store");
/// ```
pub async fn create_store(
    config: &crate::config::StoreConfig,
) -> Result<Arc<dyn KvStore>, StoreError> {
    match config.backend {
        crate::config::StoreBackend::InMemory => Ok(Arc::new(memory::InMemoryStore::new(
            config.memory_capacity,
        ))),
        crate::config::StoreBackend::Redis => {
            if config.redis_url.is_empty() {
                return Err(StoreError::Config(
                    "Redis URL is required for the Redis store".to_string(),
                ));
            }
            let store = redis::RedisStore::new(&config.redis_url)
                .await
                .map_err(StoreError::Config)?;
            Ok(Arc::new(store))
        }
    }
}
