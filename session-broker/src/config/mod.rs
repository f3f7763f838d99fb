pub(crate) use crate::config::oauth::OAuthConfig;
pub(crate) use crate::config::session::SessionConfig;
pub(crate) use crate::config::store::{StoreBackend, StoreConfig};
use confique::Config;

pub mod oauth;
pub mod session;
pub mod store;

/// Main configuration structure for the session broker
#[derive(Debug, Config, Clone)]
pub struct BrokerConfig {
    /// The port the broker will listen to (default: 8080)
    #[config(env = "BROKER_PORT", default = 8080)]
    pub port: u16,

    /// Derive the request scheme from `X-Forwarded-Proto` when the request
    /// line carries no absolute URI (default: true)
    #[config(env = "BROKER_TRUST_FORWARDED_PROTO", default = true)]
    pub trust_forwarded_proto: bool,

    /// Key-value store configuration
    #[config(nested)]
    pub store: StoreConfig,

    /// OAuth 2.0 provider configuration
    #[config(nested)]
    pub oauth: OAuthConfig,

    /// Cookie and session lifetime configuration
    #[config(nested)]
    pub session: SessionConfig,
}

impl BrokerConfig {
    /// Creates a new Config instance from environment variables
    pub fn new() -> Result<Self, String> {
        Self::builder().env().load().map_err(|e| e.to_string())
    }

    #[cfg(test)]
    pub fn for_test_with_mocks(provider_mock: &wiremock::MockServer) -> Self {
        Self {
            port: 0, // Let the OS choose a port
            trust_forwarded_proto: true,
            store: StoreConfig {
                backend: StoreBackend::InMemory,
                redis_url: String::new(),
                memory_capacity: 1024,
            },
            oauth: OAuthConfig {
                client_id: "test-client".to_string(),
                client_secret: Some("test-secret".to_string()),
                authorization_endpoint: format!("{}/authorize", provider_mock.uri()),
                token_endpoint: format!("{}/token", provider_mock.uri()),
                redirect_uri: Some("https://app.example.com/callback".to_string()),
                scopes: "openid,profile".to_string(),
                request_timeout: 5,
            },
            session: SessionConfig {
                pending_ttl: 600,
                max_age: 7_776_000,
                signed_in_path: "/".to_string(),
                signed_out_path: "/".to_string(),
            },
        }
    }
}
