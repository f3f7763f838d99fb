//! OAuth 2.0 authorization code client with PKCE (RFC 6749 §4.1, RFC 7636)

use super::{pkce, AuthorizationUri, OAuthClient, OAuthError};
use crate::config::OAuthConfig;
use crate::records::TokenSession;
use chrono::{DateTime, Utc};
use http::header::ACCEPT;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Token endpoint response. Some providers answer errors with `200 OK`, so
/// both shapes are accepted and told apart afterwards.
#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth client talking to a provider over HTTP
#[derive(Clone)]
pub struct HttpOAuthClient {
    http: Client,
    client_id: String,
    client_secret: Option<String>,
    authorization_endpoint: Url,
    token_endpoint: Url,
    redirect_uri: Option<Url>,
    scopes: Vec<String>,
}

impl HttpOAuthClient {
    pub fn new(config: &OAuthConfig) -> Result<Self, OAuthError> {
        let parse = |name: &str, value: &str| {
            Url::parse(value).map_err(|e| OAuthError::Config(format!("{name}: {e}")))
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(2))
            .build()?;

        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            authorization_endpoint: parse(
                "authorization_endpoint",
                &config.authorization_endpoint,
            )?,
            token_endpoint: parse("token_endpoint", &config.token_endpoint)?,
            redirect_uri: config
                .redirect_uri
                .as_deref()
                .map(|uri| parse("redirect_uri", uri))
                .transpose()?,
            scopes: config.get_scopes(),
        })
    }
}

#[async_trait::async_trait]
impl OAuthClient for HttpOAuthClient {
    async fn authorization_uri(&self, state: &str) -> Result<AuthorizationUri, OAuthError> {
        let code_verifier = pkce::generate_code_verifier();
        let challenge = pkce::code_challenge(&code_verifier);

        let mut uri = self.authorization_endpoint.clone();
        {
            let mut query = uri.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id);
            if let Some(redirect_uri) = &self.redirect_uri {
                query.append_pair("redirect_uri", redirect_uri.as_str());
            }
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes.join(" "));
            }
            query
                .append_pair("state", state)
                .append_pair("code_challenge", &challenge)
                .append_pair("code_challenge_method", "S256");
        }

        Ok(AuthorizationUri { uri, code_verifier })
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSession, OAuthError> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", code_verifier),
            ("client_id", self.client_id.as_str()),
        ];
        if let Some(redirect_uri) = &self.redirect_uri {
            params.push(("redirect_uri", redirect_uri.as_str()));
        }
        if let Some(secret) = &self.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http
            .post(self.token_endpoint.clone())
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Token endpoint returned status {}", status);
            return Err(OAuthError::TokenEndpoint {
                status: status.as_u16(),
                detail,
            });
        }

        let raw: RawTokenResponse = response.json().await?;
        if let Some(error) = raw.error {
            let detail = match raw.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error,
            };
            return Err(OAuthError::Provider(detail));
        }

        let (access_token, token_type) = match (raw.access_token, raw.token_type) {
            (Some(access_token), Some(token_type)) => (access_token, token_type),
            _ => {
                return Err(OAuthError::Provider(
                    "token response is missing access_token or token_type".to_string(),
                ))
            }
        };

        debug!(
            "Exchanged authorization code for a {} token (refresh token: {})",
            token_type,
            raw.refresh_token.is_some()
        );

        Ok(TokenSession {
            access_token,
            token_type,
            refresh_token: raw.refresh_token,
            expires_at: raw.expires_in.and_then(expiry_from_now),
            scope: raw.scope,
        })
    }
}

/// Absolute expiry for a relative `expires_in`. Values outside the
/// representable range are dropped.
fn expiry_from_now(secs: i64) -> Option<DateTime<Utc>> {
    let expiry = chrono::Duration::try_seconds(secs)
        .and_then(|delta| Utc::now().checked_add_signed(delta));
    if expiry.is_none() {
        warn!("Ignoring out-of-range expires_in: {}", secs);
    }
    expiry
}
