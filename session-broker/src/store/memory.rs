use super::{KvStore, StoreError};
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::Expiry;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
    expires_at: Option<Instant>,
}

impl Entry {
    /// moka's `remove` still hands back entries whose expiry has passed but
    /// which housekeeping has not evicted yet.
    fn live(self) -> Option<String> {
        match self.expires_at {
            Some(deadline) if Instant::now() >= deadline => None,
            _ => Some(self.value),
        }
    }
}

/// Per-entry expiry: each write restarts the clock with the TTL it carries.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

#[derive(Clone)]
pub struct InMemoryStore {
    cache: MokaCache<String, Entry>,
}

impl InMemoryStore {
    /// Initialize a new in-memory store holding at most `capacity` entries
    pub fn new(capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(capacity)
            .expire_after(EntryExpiry)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.get(key).await.and_then(Entry::live))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value,
                    ttl,
                    expires_at,
                },
            )
            .await;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.remove(key).await.and_then(Entry::live))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
