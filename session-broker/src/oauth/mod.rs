//! OAuth 2.0 client capability
//!
//! The flow controller only needs two things from an OAuth client: an
//! authorization URI bound to a `state`, and a code-for-token exchange. Both
//! sit behind [`OAuthClient`] so the provider integration can be swapped
//! (or faked in tests) without touching session handling.

pub mod client;
pub mod pkce;

use crate::records::TokenSession;
use thiserror::Error;
use url::Url;

pub use client::HttpOAuthClient;

/// Errors raised by the OAuth client
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid OAuth configuration: {0}")]
    Config(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token endpoint returned {status}: {detail}")]
    TokenEndpoint { status: u16, detail: String },
    #[error("Provider returned an error: {0}")]
    Provider(String),
}

/// Authorization URI to redirect the client to, and the PKCE verifier bound
/// to it
#[derive(Debug, Clone)]
pub struct AuthorizationUri {
    pub uri: Url,
    pub code_verifier: String,
}

#[async_trait::async_trait]
pub trait OAuthClient: Send + Sync {
    /// Build the provider authorization URI for `state` along with a fresh
    /// PKCE code verifier
    async fn authorization_uri(&self, state: &str) -> Result<AuthorizationUri, OAuthError>;

    /// Exchange an authorization code for tokens
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenSession, OAuthError>;
}
