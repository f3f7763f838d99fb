//! Sign-in, callback, sign-out and session resolution
//!
//! [`SessionBroker`] ties the OAuth client, the cookie helpers and the record
//! store together. It holds no per-request state: everything that outlives a
//! request lives in the record store.

use crate::config::SessionConfig;
use crate::cookies::{
    build_cookie, cookie_name, is_secure, read_cookie, removal_cookie, OAUTH_COOKIE_NAME,
    SITE_COOKIE_NAME,
};
use crate::headers::no_store;
use crate::ids::IdSource;
use crate::oauth::{AuthorizationUri, OAuthClient, OAuthError};
use crate::records::{PendingAuthorization, RecordError, RecordStore, TokenSession};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use http::header::{HOST, LOCATION};
use http::{HeaderMap, StatusCode, Uri};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors surfaced by the flow operations
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Record store error: {0}")]
    Store(#[from] RecordError),
    #[error("OAuth provider error: {0}")]
    Provider(#[from] OAuthError),
    #[error("Invalid callback: {0}")]
    InvalidCallback(&'static str),
}

#[derive(Clone)]
pub struct SessionBroker {
    records: RecordStore,
    oauth: Arc<dyn OAuthClient>,
    ids: Arc<dyn IdSource>,
    settings: SessionConfig,
}

impl SessionBroker {
    pub fn new(
        records: RecordStore,
        oauth: Arc<dyn OAuthClient>,
        ids: Arc<dyn IdSource>,
        settings: SessionConfig,
    ) -> Self {
        Self {
            records,
            oauth,
            ids,
            settings,
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Start the authorization code flow.
    ///
    /// The pending authorization is committed before the redirect is built,
    /// so the callback can always find it. On any error nothing is written
    /// and no cookie is set.
    pub async fn sign_in(&self, request_url: &Url) -> Result<Response, FlowError> {
        let state = self.ids.generate();
        let AuthorizationUri { uri, code_verifier } =
            self.oauth.authorization_uri(&state).await?;

        let pending_id = self.ids.generate();
        self.records
            .put_pending_authorization(
                &pending_id,
                &PendingAuthorization {
                    state,
                    code_verifier,
                },
            )
            .await?;

        let secure = is_secure(request_url);
        let cookie = build_cookie(
            &cookie_name(OAUTH_COOKIE_NAME, secure),
            &pending_id,
            max_age(self.settings.pending_ttl),
            secure,
        );

        debug!("Redirecting to provider (secure transport: {})", secure);
        Ok(redirect(uri.as_str(), CookieJar::new().add(cookie)))
    }

    /// Resolve the site session of a request.
    ///
    /// A missing cookie, an unknown identifier and a failing store all
    /// resolve to `None`; only the logs tell them apart.
    pub async fn get_session_id(&self, headers: &HeaderMap, request_url: &Url) -> Option<String> {
        let name = cookie_name(SITE_COOKIE_NAME, is_secure(request_url));
        let session_id = read_cookie(headers, &name)?;

        match self.records.get_token_session(&session_id).await {
            Ok(Some(_)) => Some(session_id),
            Ok(None) => {
                debug!("Session cookie does not match a stored session");
                None
            }
            Err(e) => {
                warn!("Session lookup failed, treating request as signed out: {}", e);
                None
            }
        }
    }

    /// Token material of a resolved session
    pub async fn get_session_tokens(
        &self,
        session_id: &str,
    ) -> Result<Option<TokenSession>, FlowError> {
        Ok(self.records.get_token_session(session_id).await?)
    }

    /// Complete the authorization code flow.
    ///
    /// The pending authorization is consumed before anything else is checked,
    /// so a callback URL can only ever be redeemed once. Returns the redirect
    /// response and the new session id.
    pub async fn handle_callback(
        &self,
        headers: &HeaderMap,
        request_url: &Url,
    ) -> Result<(Response, String), FlowError> {
        let secure = is_secure(request_url);
        let oauth_cookie = cookie_name(OAUTH_COOKIE_NAME, secure);

        let pending_id = read_cookie(headers, &oauth_cookie)
            .ok_or(FlowError::InvalidCallback("missing OAuth session cookie"))?;
        let pending = self
            .records
            .take_pending_authorization(&pending_id)
            .await?
            .ok_or(FlowError::InvalidCallback("unknown or expired OAuth session"))?;

        let params: HashMap<String, String> = request_url.query_pairs().into_owned().collect();
        if let Some(error) = params.get("error") {
            let detail = match params.get("error_description") {
                Some(description) => format!("{error}: {description}"),
                None => error.clone(),
            };
            return Err(OAuthError::Provider(detail).into());
        }
        if params.get("state") != Some(&pending.state) {
            return Err(FlowError::InvalidCallback("state mismatch"));
        }
        let code = params
            .get("code")
            .ok_or(FlowError::InvalidCallback("missing authorization code"))?;

        let tokens = self
            .oauth
            .exchange_code(code, &pending.code_verifier)
            .await?;

        let session_id = self.ids.generate();
        self.records.put_token_session(&session_id, &tokens).await?;

        let jar = CookieJar::new()
            .add(removal_cookie(&oauth_cookie, secure))
            .add(build_cookie(
                &cookie_name(SITE_COOKIE_NAME, secure),
                &session_id,
                max_age(self.settings.max_age),
                secure,
            ));

        info!("OAuth sign-in completed");
        Ok((redirect(&self.settings.signed_in_path, jar), session_id))
    }

    /// End the site session: delete its tokens and clear the cookie.
    pub async fn sign_out(
        &self,
        headers: &HeaderMap,
        request_url: &Url,
    ) -> Result<Response, FlowError> {
        let secure = is_secure(request_url);
        let name = cookie_name(SITE_COOKIE_NAME, secure);

        if let Some(session_id) = read_cookie(headers, &name) {
            self.records.delete_token_session(&session_id).await?;
            info!("Signed out session");
        }

        let jar = CookieJar::new().add(removal_cookie(&name, secure));
        Ok(redirect(&self.settings.signed_out_path, jar))
    }
}

/// Absolute URL of the request.
///
/// Servers usually see origin-form request targets (`/signin`), so the scheme
/// falls back to `X-Forwarded-Proto` when `trust_forwarded` is set and to
/// `http` otherwise, and the authority to the `Host` header. Without either
/// an absolute URI or a `Host` header there is no URL.
pub fn request_url(headers: &HeaderMap, uri: &Uri, trust_forwarded: bool) -> Option<Url> {
    let forwarded = || {
        headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| v == "http" || v == "https")
    };

    let scheme = match uri.scheme_str() {
        Some(scheme) => scheme.to_string(),
        None if trust_forwarded => forwarded().unwrap_or_else(|| "http".to_string()),
        None => "http".to_string(),
    };
    let host = match uri.authority() {
        Some(authority) => authority.to_string(),
        None => headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())?
            .to_string(),
    };
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");

    Url::parse(&format!("{scheme}://{host}{path}")).ok()
}

fn redirect(location: &str, jar: CookieJar) -> Response {
    let mut response = (StatusCode::FOUND, jar, [(LOCATION, location.to_string())]).into_response();
    no_store(&mut response);
    response
}

fn max_age(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}
