use crate::flow::request_url;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

/// Site session of the request, if any.
///
/// Never rejects: a missing cookie, an unknown identifier and an unreachable
/// store all yield `CurrentSession(None)`.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(CurrentSession(session): CurrentSession) -> impl IntoResponse {
///     match session {
///         Some(_) => "Welcome back",
///         None => "Please sign in",
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentSession(pub Option<String>);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_id = match request_url(
            &parts.headers,
            &parts.uri,
            state.config.trust_forwarded_proto,
        ) {
            Some(url) => state.broker.get_session_id(&parts.headers, &url).await,
            None => None,
        };

        Ok(Self(session_id))
    }
}
