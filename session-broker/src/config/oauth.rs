//! OAuth 2.0 provider configuration

use confique::Config;

/// OAuth 2.0 provider configuration
#[derive(Debug, Config, Clone)]
pub struct OAuthConfig {
    /// Client identifier registered with the provider
    #[config(env = "BROKER_OAUTH_CLIENT_ID")]
    pub client_id: String,

    /// Client secret, sent during the token exchange when present
    #[config(env = "BROKER_OAUTH_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Provider authorization endpoint
    #[config(env = "BROKER_OAUTH_AUTHORIZATION_ENDPOINT")]
    pub authorization_endpoint: String,

    /// Provider token endpoint
    #[config(env = "BROKER_OAUTH_TOKEN_ENDPOINT")]
    pub token_endpoint: String,

    /// Callback URL sent to the provider; omitted when the provider has a
    /// single registered redirect URI
    #[config(env = "BROKER_OAUTH_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Requested scopes, comma-separated (default: none)
    #[config(env = "BROKER_OAUTH_SCOPES", default = "")]
    pub scopes: String,

    /// Token exchange timeout in seconds (default: 10)
    #[config(env = "BROKER_OAUTH_REQUEST_TIMEOUT", default = 10)]
    pub request_timeout: u64,
}

impl OAuthConfig {
    /// Get scopes as a vector
    pub fn get_scopes(&self) -> Vec<String> {
        self.scopes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_scopes(scopes: &str) -> OAuthConfig {
        OAuthConfig {
            client_id: "client".to_string(),
            client_secret: None,
            authorization_endpoint: "https://provider.example.com/authorize".to_string(),
            token_endpoint: "https://provider.example.com/token".to_string(),
            redirect_uri: None,
            scopes: scopes.to_string(),
            request_timeout: 10,
        }
    }

    #[test]
    fn test_get_scopes() {
        let config = config_with_scopes("openid,profile,email");
        assert_eq!(config.get_scopes(), vec!["openid", "profile", "email"]);
    }

    #[test]
    fn test_get_scopes_with_spaces() {
        let config = config_with_scopes(" openid , profile ,, ");
        assert_eq!(config.get_scopes(), vec!["openid", "profile"]);
    }

    #[test]
    fn test_get_scopes_empty() {
        let config = config_with_scopes("");
        assert!(config.get_scopes().is_empty());
    }
}
