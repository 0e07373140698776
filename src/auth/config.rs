use axum_extra::extract::cookie::Key;

/// Session and login settings shared by the extractors and auth routes.
#[derive(Clone)]
pub struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) remember_cookie_name: String,
    pub(crate) remember_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) login_path: String,
    pub(crate) logout_path: String,
    pub(crate) login_redirect: String,
    pub(crate) logout_redirect: String,
}

impl AuthSettings {
    pub(crate) fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "session".into(),
            session_ttl_days: 7,
            remember_cookie_name: "remember_token".into(),
            remember_ttl_days: 365,
            secure_cookies: true,
            login_path: "/login".into(),
            logout_path: "/logout".into(),
            login_redirect: "/".into(),
            logout_redirect: "/".into(),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self::defaults()
    }
}
