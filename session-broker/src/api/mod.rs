pub(crate) mod auth;
pub(crate) mod extractor;
pub(crate) mod health;

use crate::state::AppState;
use axum::Router;

pub use extractor::CurrentSession;

/// Combines all API routes into a single router
pub(super) fn router() -> Router<AppState> {
    Router::new().merge(health::router()).merge(auth::router())
}
