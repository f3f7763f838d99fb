use crate::config::BrokerConfig;
use crate::create_app;
use crate::state::tests::create_test_state;
use crate::store::memory::InMemoryStore;
use crate::store::KvStore;
use axum::body::Body;
use axum::Router;
use http::header::{HeaderName, SET_COOKIE};
use http::{HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

/// Host every fixture request is addressed to
pub const TEST_HOST: &str = "app.example.com";

/// Test fixture for exercising the full router against a mocked OAuth provider.
///
/// The provider mock serves `/authorize` and `/token`; tests mount the token
/// responses they need on `provider_mock`.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///
///     Mock::given(method("POST"))
///         .and(path("/token"))
///         .respond_with(ResponseTemplate::new(200).set_body_json(json!({
///             "access_token": "at", "token_type": "Bearer"
///         })))
///         .mount(&fixture.provider_mock)
///         .await;
///
///     let response = fixture.get_secure("/signin", &[]).await;
///     response.assert_status(StatusCode::FOUND);
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration the router was built with
    pub config: BrokerConfig,
    /// Mock server for the OAuth provider
    pub provider_mock: MockServer,
}

impl TestFixture {
    /// Creates a fixture backed by an in-memory session store.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new(1024))).await
    }

    /// Creates a fixture backed by the given session store.
    ///
    /// Used to inject failing stores.
    pub async fn with_store(store: Arc<dyn KvStore>) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let provider_mock = MockServer::start().await;
        let config = BrokerConfig::for_test_with_mocks(&provider_mock);

        let state = create_test_state(config.clone(), store);
        let app = create_app(state).await;

        Self {
            app,
            config,
            provider_mock,
        }
    }

    /// Initializes the test logger with the given level.
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Creates a request builder addressed to [`TEST_HOST`].
    pub fn request_builder(&self, method: Method, uri: impl AsRef<str>) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Host", TEST_HOST)
    }

    /// Sends a plain HTTP GET request.
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        self.get_with_headers(uri, &[]).await
    }

    /// Sends a plain HTTP GET request with extra headers.
    pub async fn get_with_headers(
        &self,
        uri: impl AsRef<str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = self.request_builder(Method::GET, uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = builder
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a GET request that arrived over HTTPS at the proxy.
    pub async fn get_secure(
        &self,
        uri: impl AsRef<str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut all = vec![("X-Forwarded-Proto", "https")];
        all.extend_from_slice(headers);
        self.get_with_headers(uri, &all).await
    }

    /// Sends a request and returns a TestResponse.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        let set_cookies = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();

        TestResponse {
            status,
            headers,
            set_cookies,
            json,
        }
    }
}

/// Response from a test request with convenient access to status, headers and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Every Set-Cookie header value, in order
    pub set_cookies: Vec<String>,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Value of a response header, if present and valid UTF-8.
    pub fn header(&self, name: HeaderName) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Converts the response body to the specified type.
    ///
    /// # Panics
    ///
    /// Panics if deserialization fails.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}
