use argon2::Params;
use axum_extra::extract::cookie::Key;

use crate::auth::AuthSettings;
use crate::error::Error;

/// Application configuration.
///
/// Use [`from_env()`](AppConfig::from_env) for deployment, or
/// [`new()`](AppConfig::new) with `with_*` methods for full control.
#[derive(Clone)]
pub struct AppConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) auth: AuthSettings,
    pub(crate) hash_params: Params,
}

impl AppConfig {
    /// Defaults: `127.0.0.1:5000`, ephemeral cookie key, secure cookies,
    /// 7-day permanent sessions, 365-day remember tokens.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5000,
            auth: AuthSettings::defaults(),
            hash_params: Params::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `HOST`: bind address (default `127.0.0.1`)
    /// - `PORT`: bind port (default `5000`)
    /// - `SECRET_KEY`: cookie signing/encryption key, at least 64 bytes.
    ///   Without it an ephemeral key is generated and sessions do not
    ///   survive a restart.
    /// - `DEV_COOKIES`: `"1"` or `"true"` drops the `Secure` cookie attribute
    ///   so plain-HTTP development servers work
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `PORT` is not a number or `SECRET_KEY`
    /// is too short.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::new();

        if let Ok(host) = std::env::var("HOST") {
            config = config.with_host(host);
        }
        if let Ok(port) = std::env::var("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| Error::Config(format!("PORT: {e}")))?;
            config = config.with_port(port);
        }

        let cookie_key = match std::env::var("SECRET_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                Error::Config(
                    "SECRET_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => {
                tracing::warn!("SECRET_KEY not set, using an ephemeral cookie key");
                Key::generate()
            }
        };

        let dev_cookies = matches!(
            std::env::var("DEV_COOKIES").as_deref(),
            Ok("1") | Ok("true"),
        );

        Ok(config
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev_cookies))
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.auth.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.auth.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.auth.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_remember_ttl_days(mut self, days: i64) -> Self {
        self.auth.remember_ttl_days = days;
        self
    }

    /// Argon2 cost parameters for credential hashing.
    #[must_use]
    pub fn with_hash_params(mut self, params: Params) -> Self {
        self.hash_params = params;
        self
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
