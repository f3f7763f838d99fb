use super::{KvStore, StoreError};
use async_trait::async_trait;
use log::error;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;

#[derive(Clone)]
pub struct RedisStore {
    _client: Client,
    conn_manager: ConnectionManager,
}

impl RedisStore {
    /// Initialize a new Redis store instance
    pub async fn new(redis_url: &str) -> Result<Self, String> {
        let client = match Client::open(redis_url) {
            Ok(client) => client,
            Err(err) => {
                return Err(format!("Failed to connect to Redis: {}", err));
            }
        };

        let conn_manager = match ConnectionManager::new(client.clone()).await {
            Ok(manager) => manager,
            Err(err) => {
                return Err(format!(
                    "Failed to create Redis connection manager: {}",
                    err
                ));
            }
        };

        // Test the connection to ensure it's working
        let mut conn = conn_manager.clone();
        if let Err(err) = redis::cmd("PING").query_async::<String>(&mut conn).await {
            return Err(format!("Failed to ping Redis: {}", err));
        }

        Ok(Self {
            conn_manager,
            _client: client,
        })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn_manager.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => Ok(value),
            Err(err) => {
                error!("Redis error while getting key: {}", err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn_manager.clone();

        let result = match ttl {
            // SET EX rejects 0, so round sub-second TTLs up
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };

        result.map_err(|err| {
            error!("Redis error while setting key: {}", err);
            StoreError::Redis(err.to_string())
        })
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn_manager.clone();

        match redis::cmd("GETDEL")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await
        {
            Ok(value) => Ok(value),
            Err(err) => {
                error!("Redis error while taking key: {}", err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn_manager.clone();

        match conn.del::<_, ()>(key).await {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("Redis error while deleting key: {}", err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        let mut conn = self.conn_manager.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(err) => Err(format!("Redis health check failed: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis_test::server::RedisServer;

    fn get_redis_url(server: &RedisServer) -> String {
        match &server.addr {
            redis::ConnectionAddr::Tcp(host, port) => {
                format!("redis://{}:{}/", host, port)
            }
            _ => "redis://127.0.0.1:6379/".to_string(),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_store_operations() {
        // Start a Redis server for testing
        let server = RedisServer::new();
        let redis_url = get_redis_url(&server);
        let store = RedisStore::new(&redis_url).await.unwrap();

        store
            .set("test_key", "test".to_string(), Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert_eq!(store.get("test_key").await.unwrap().as_deref(), Some("test"));

        // Test expiration
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.get("test_key").await.unwrap().is_none());

        // Take is single-use
        store.set("once", "value".to_string(), None).await.unwrap();
        assert_eq!(store.take("once").await.unwrap().as_deref(), Some("value"));
        assert!(store.take("once").await.unwrap().is_none());

        // Delete is idempotent
        store.delete("missing").await.unwrap();
        store.delete("missing").await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_health_check() {
        let server = RedisServer::new();
        let redis_url = get_redis_url(&server);
        let store = RedisStore::new(&redis_url).await.unwrap();

        let result = store.health_check().await;

        assert!(result.is_ok(), "health check failed: {:?}", result);
    }
}
