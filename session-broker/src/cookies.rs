//! Transport-aware session cookies
//!
//! A cookie issued over HTTPS is named with the `__Host-` prefix, which
//! browsers only accept with `Secure`, `Path=/` and no `Domain`. A cookie
//! issued over plain HTTP keeps the bare name. The two can never shadow each
//! other, so a value planted over plaintext is never read on a secure request.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::HeaderMap;
use time::Duration;
use url::Url;

/// Base name of the cookie carrying the pending authorization id
pub const OAUTH_COOKIE_NAME: &str = "oauth-session";

/// Base name of the cookie carrying the token session id
pub const SITE_COOKIE_NAME: &str = "site-session";

const SECURE_PREFIX: &str = "__Host-";

/// Whether the request arrived over a secure transport
pub fn is_secure(url: &Url) -> bool {
    url.scheme() == "https"
}

/// Cookie name for `base` under the given transport security
pub fn cookie_name(base: &str, secure: bool) -> String {
    if secure {
        format!("{SECURE_PREFIX}{base}")
    } else {
        base.to_string()
    }
}

/// HttpOnly cookie scoped to the whole site.
///
/// `SameSite=Lax` still sends the cookie on the top-level navigation back
/// from the provider.
pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Cookie that makes the client discard `name` immediately
pub fn removal_cookie(name: &str, secure: bool) -> Cookie<'static> {
    build_cookie(name, "", 0, secure)
}

/// Value of the cookie `name` from the request's `Cookie` header
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(name)
        .map(|cookie| cookie.value().to_string())
}
