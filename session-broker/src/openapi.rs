use crate::api::{auth, health};
use crate::state::AppState;
use axum::response::IntoResponse;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

pub(crate) const HEALTH_TAG: &str = "Health API";
pub(crate) const AUTH_TAG: &str = "Authentication API";

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::ready_check,
        auth::sign_in,
        auth::callback,
        auth::sign_out,
        auth::session,
    ),
    components(schemas(health::Health, auth::SessionInfo)),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = AUTH_TAG, description = "OAuth 2.0 sign-in and session endpoints"),
    ),
    info(
        title = "Session Broker API",
        description = "OAuth 2.0 authorization code flow with cookie-bound sessions",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Handler for the OpenAPI JSON specification endpoint
async fn openapi_json_handler() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Creates a router for OpenAPI documentation routes
pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestFixture;

    #[test]
    fn test_openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/ready", "/signin", "/callback", "/signout", "/session"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn test_openapi_json_endpoint() {
        let fixture = TestFixture::new().await;
        let response = fixture.get("/openapi.json").await;
        response.assert_ok();
        assert_eq!(response.json["info"]["title"], "Session Broker API");
    }
}
