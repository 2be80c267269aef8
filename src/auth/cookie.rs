//! Session cookie carrying the access token for browser clients.

use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use time::{Duration, OffsetDateTime};

pub(crate) const SESSION_COOKIE: &str = "app_session_id";

/// Adds the session cookie holding `access_token`, valid for `ttl`.
pub(crate) fn set_session_cookie(
    jar: CookieJar,
    access_token: String,
    ttl: std::time::Duration,
    secure: bool,
) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, access_token))
            .path("/")
            .max_age(Duration::seconds(ttl.as_secs() as i64))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}

/// Overwrites the session cookie with an expired, empty one.
pub(crate) fn clear_session_cookie(jar: CookieJar, secure: bool) -> CookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure),
    )
}
