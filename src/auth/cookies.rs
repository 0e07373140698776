use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Create the session cookie.
///
/// `ttl_days` of `None` yields a browser-session cookie; permanent sessions
/// pass their lifetime and get it renewed on every write.
pub(super) fn session_cookie(
    name: &str,
    value: String,
    ttl_days: Option<i64>,
    secure: bool,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_string(), value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string());
    if let Some(days) = ttl_days {
        builder = builder.max_age(Duration::days(days));
    }
    builder.build()
}

/// Create the long-lived remember-me cookie.
pub(super) fn remember_cookie(
    name: &str,
    value: String,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(ttl_days))
        .build()
}

/// Create a removal cookie for `name` at path `/`.
pub(super) fn removal_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
