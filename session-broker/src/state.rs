use crate::{
    config::BrokerConfig,
    flow::SessionBroker,
    ids::{IdSource, RandomIdSource},
    oauth::{HttpOAuthClient, OAuthClient},
    records::RecordStore,
    store::{create_store, KvStore},
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BrokerConfig>,
    pub broker: Arc<SessionBroker>,
}

impl AppState {
    pub async fn new(config: BrokerConfig) -> Result<Self, std::io::Error> {
        let store = create_store(&config.store).await.map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to create store: {}", e),
            )
        })?;
        let oauth = HttpOAuthClient::new(&config.oauth).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Failed to create OAuth client: {}", e),
            )
        })?;

        Ok(Self::with_parts(
            config,
            store,
            Arc::new(oauth),
            Arc::new(RandomIdSource),
        ))
    }

    /// Assemble the state from explicit collaborators
    pub fn with_parts(
        config: BrokerConfig,
        store: Arc<dyn KvStore>,
        oauth: Arc<dyn OAuthClient>,
        ids: Arc<dyn IdSource>,
    ) -> Self {
        let records = RecordStore::new(
            store,
            Duration::from_secs(config.session.pending_ttl),
            Duration::from_secs(config.session.max_age),
        );
        let broker = SessionBroker::new(records, oauth, ids, config.session.clone());

        Self {
            config: Arc::new(config),
            broker: Arc::new(broker),
        }
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> Result<(), String> {
        self.broker.records().store().health_check().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::test::UnavailableStore;

    pub(crate) fn create_test_state(config: BrokerConfig, store: Arc<dyn KvStore>) -> AppState {
        let oauth = HttpOAuthClient::new(&config.oauth).expect("Failed to create OAuth client");
        AppState::with_parts(config, store, Arc::new(oauth), Arc::new(RandomIdSource))
    }

    #[tokio::test]
    async fn test_app_state_new() {
        let mock = wiremock::MockServer::start().await;
        let config = BrokerConfig::for_test_with_mocks(&mock);

        let state = AppState::new(config.clone()).await.unwrap();

        assert_eq!(state.config.port, config.port);
        assert_eq!(state.config.session.pending_ttl, 600);
        assert!(state.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_app_state_rejects_bad_oauth_config() {
        let mock = wiremock::MockServer::start().await;
        let mut config = BrokerConfig::for_test_with_mocks(&mock);
        config.oauth.token_endpoint = "::not a url::".to_string();

        let result = AppState::new(config).await;
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(std::io::ErrorKind::InvalidInput)
        );
    }

    #[tokio::test]
    async fn test_health_check_reports_store_outage() {
        let mock = wiremock::MockServer::start().await;
        let state = create_test_state(
            BrokerConfig::for_test_with_mocks(&mock),
            Arc::new(UnavailableStore),
        );
        assert!(state.health_check().await.is_err());
    }

    #[tokio::test]
    async fn test_app_state_clone() {
        let mock = wiremock::MockServer::start().await;
        let state = create_test_state(
            BrokerConfig::for_test_with_mocks(&mock),
            Arc::new(InMemoryStore::new(16)),
        );
        let state2 = state.clone();

        // After cloning, both instances should point to the same data
        assert_eq!(Arc::as_ptr(&state.config), Arc::as_ptr(&state2.config));
        assert_eq!(Arc::as_ptr(&state.broker), Arc::as_ptr(&state2.broker));
    }
}
