//! OAuth sign-in endpoints

use crate::api::extractor::CurrentSession;
use crate::errors::ApiError;
use crate::flow::request_url;
use crate::openapi::AUTH_TAG;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

/// Session of the calling client
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    /// Opaque session identifier, or null when signed out
    pub session_id: Option<String>,
}

fn url_of(state: &AppState, headers: &HeaderMap, uri: &Uri) -> Result<Url, ApiError> {
    request_url(headers, uri, state.config.trust_forwarded_proto)
        .ok_or_else(|| ApiError::bad_request("Invalid request URL"))
}

/// Start the OAuth 2.0 authorization code flow
#[utoipa::path(
    get,
    path = "/signin",
    tag = AUTH_TAG,
    responses(
        (status = 302, description = "Redirect to the provider, sets the OAuth session cookie"),
        (status = 502, description = "Authorization URI could not be built"),
        (status = 503, description = "Session store is unreachable")
    )
)]
pub(crate) async fn sign_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let url = url_of(&state, &headers, &uri)?;
    Ok(state.broker.sign_in(&url).await?)
}

/// OAuth 2.0 redirection endpoint
#[utoipa::path(
    get,
    path = "/callback",
    tag = AUTH_TAG,
    params(
        ("code" = Option<String>, Query, description = "Authorization code"),
        ("state" = Option<String>, Query, description = "State echoed by the provider"),
        ("error" = Option<String>, Query, description = "Provider error code")
    ),
    responses(
        (status = 302, description = "Signed in, sets the site session cookie"),
        (status = 400, description = "Missing, expired, replayed or forged callback"),
        (status = 502, description = "Provider rejected the request or the code exchange"),
        (status = 503, description = "Session store is unreachable")
    )
)]
pub(crate) async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let url = url_of(&state, &headers, &uri)?;
    let (response, _session_id) = state.broker.handle_callback(&headers, &url).await?;
    Ok(response)
}

/// End the current session
#[utoipa::path(
    get,
    path = "/signout",
    tag = AUTH_TAG,
    responses(
        (status = 302, description = "Signed out, clears the site session cookie"),
        (status = 503, description = "Session store is unreachable")
    )
)]
pub(crate) async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let url = url_of(&state, &headers, &uri)?;
    Ok(state.broker.sign_out(&headers, &url).await?)
}

/// Current session identifier
#[utoipa::path(
    get,
    path = "/session",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Session of the caller", body = SessionInfo)
    )
)]
pub(crate) async fn session(CurrentSession(session_id): CurrentSession) -> Json<SessionInfo> {
    Json(SessionInfo { session_id })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", get(sign_in))
        .route("/callback", get(callback))
        .route("/signout", get(sign_out))
        .route("/session", get(session))
}
