use confique::Config;
use serde::Deserialize;

/// Specifies which key-value store implementation to use
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    InMemory,
    Redis,
}

/// Configuration for the record store
#[derive(Debug, Config, Clone)]
pub struct StoreConfig {
    /// Store backend: "in-memory" or "redis" (default: in-memory)
    #[config(env = "BROKER_STORE_BACKEND", default = "in-memory")]
    pub backend: StoreBackend,

    /// Redis connection string
    #[config(env = "BROKER_STORE_REDIS_URL", default = "")]
    pub redis_url: String,

    /// Maximum number of entries held by the in-memory store (default: 100000)
    #[config(env = "BROKER_STORE_MEMORY_CAPACITY", default = 100000)]
    pub memory_capacity: u64,
}
