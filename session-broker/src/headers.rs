use axum::http::HeaderValue;
use axum::response::Response;
use http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};

/// Mark a response as uncacheable by shared caches and the browser cache.
///
/// Applied to every response that sets or clears a session cookie.
pub fn no_store<B>(response: &mut Response<B>) {
    let headers = response.headers_mut();
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, private"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
}
