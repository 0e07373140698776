use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;
use time::OffsetDateTime;

use super::config::AuthSettings;
use super::cookies;
use super::error::AuthError;
use super::remember::RememberToken;
use super::session::Session;
use crate::counter::Caller;
use crate::directory::{Identity, UserDirectory};
use crate::state::AppState;
use crate::types::{Flash, FlashLevel, UserId};

const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Pending change to the remember-me cookie, applied on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RememberChange {
    Keep,
    Issue(UserId),
    Revoke,
}

/// The caller's session for the current request.
///
/// Extracting it decodes the session cookie and resolves the bound
/// identity, falling back to a remember token when the session carries
/// none. Handlers mutate it and hand [`commit`](Self::commit)'s jar back
/// in their response so changes reach the client.
///
/// ```rust,ignore
/// async fn page(mut session: SessionContext) -> impl IntoResponse {
///     session.flash(FlashLevel::Info, "Hello");
///     (session.commit(), "ok")
/// }
/// ```
pub struct SessionContext {
    jar: PrivateCookieJar,
    session: Session,
    identity: Option<Arc<Identity>>,
    settings: Arc<AuthSettings>,
    had_cookie: bool,
    modified: bool,
    remember: RememberChange,
}

impl SessionContext {
    pub(crate) fn load(
        jar: PrivateCookieJar,
        directory: &UserDirectory,
        settings: Arc<AuthSettings>,
    ) -> Self {
        let raw = jar
            .get(&settings.session_cookie_name)
            .map(|c| c.value().to_string());
        let had_cookie = raw.is_some();
        let mut modified = false;

        let mut session = match raw.as_deref().map(Session::decode) {
            Some(Ok(session)) => session,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Discarding undecodable session cookie");
                modified = true;
                Session::default()
            }
            None => Session::default(),
        };

        let mut identity = None;
        if let Some(uid) = session.uid {
            identity = directory.find_by_id(uid);
            if identity.is_none() {
                tracing::warn!(user_id = %uid, "Session bound to unknown user, unbinding");
                session.uid = None;
                modified = true;
            }
        }

        let mut remember = RememberChange::Keep;
        if identity.is_none() {
            if let Some(cookie) = jar.get(&settings.remember_cookie_name) {
                let now = OffsetDateTime::now_utc();
                let restored = RememberToken::decode(cookie.value())
                    .filter(|token| token.is_valid_at(now))
                    .and_then(|token| directory.find_by_id(token.uid));
                match restored {
                    Some(found) => {
                        tracing::info!(login = %found.login, "Session restored from remember token");
                        session.uid = Some(found.id);
                        identity = Some(found);
                        modified = true;
                    }
                    None => {
                        tracing::warn!("Discarding invalid or expired remember token");
                        remember = RememberChange::Revoke;
                    }
                }
            }
        }

        Self {
            jar,
            session,
            identity,
            settings,
            had_cookie,
            modified,
            remember,
        }
    }

    /// Identity bound to this session, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_deref()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The bound identity, or [`AuthError::Unauthenticated`].
    ///
    /// # Errors
    ///
    /// Fails when the session is anonymous.
    pub fn require_identity(&self) -> Result<Arc<Identity>, AuthError> {
        self.identity.clone().ok_or(AuthError::Unauthenticated)
    }

    /// View the caller for the visit counter.
    pub fn caller(&mut self) -> Caller<'_> {
        match &self.identity {
            Some(identity) => Caller::Authenticated(identity),
            None => {
                self.modified = true;
                Caller::Anonymous(&mut self.session)
            }
        }
    }

    /// Queue a notice for the next rendered page.
    pub fn flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.session.flashes.push(Flash::new(level, message));
        self.modified = true;
    }

    /// Drain queued notices.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if !self.session.flashes.is_empty() {
            self.modified = true;
        }
        std::mem::take(&mut self.session.flashes)
    }

    /// Bind `identity` to the session.
    ///
    /// With `remember` a fresh remember token is issued for `identity`;
    /// without it any token left by an earlier login is revoked, so a
    /// restored session always matches the most recent login.
    pub fn login(&mut self, identity: Arc<Identity>, remember: bool) {
        self.session.uid = Some(identity.id);
        self.remember = if remember {
            RememberChange::Issue(identity.id)
        } else if self.jar.get(&self.settings.remember_cookie_name).is_some() {
            RememberChange::Revoke
        } else {
            RememberChange::Keep
        };
        self.identity = Some(identity);
        self.modified = true;
    }

    /// Unbind the identity and revoke the remember token.
    pub fn logout(&mut self) {
        self.session.uid = None;
        self.identity = None;
        self.remember = RememberChange::Revoke;
        self.modified = true;
    }

    /// Write pending changes into the cookie jar.
    ///
    /// Permanent sessions are rewritten on every response so their expiry
    /// slides forward. An emptied session removes the cookie.
    #[must_use]
    pub fn commit(self) -> PrivateCookieJar {
        let Self {
            mut jar,
            session,
            settings,
            had_cookie,
            modified,
            remember,
            ..
        } = self;

        match remember {
            RememberChange::Keep => {}
            RememberChange::Issue(uid) => {
                let token = RememberToken::issue(
                    uid,
                    settings.remember_ttl_days,
                    OffsetDateTime::now_utc(),
                );
                match token.encode() {
                    Ok(value) => {
                        jar = jar.add(cookies::remember_cookie(
                            &settings.remember_cookie_name,
                            value,
                            settings.remember_ttl_days,
                            settings.secure_cookies,
                        ));
                    }
                    Err(e) => tracing::error!(error = %e, "Remember token encoding failed"),
                }
            }
            RememberChange::Revoke => {
                jar = jar.remove(cookies::removal_cookie(&settings.remember_cookie_name));
            }
        }

        if session.is_empty() {
            if had_cookie {
                jar = jar.remove(cookies::removal_cookie(&settings.session_cookie_name));
            }
            return jar;
        }

        if modified || session.permanent {
            match session.encode() {
                Ok(value) => {
                    let ttl = session.permanent.then_some(settings.session_ttl_days);
                    jar = jar.add(cookies::session_cookie(
                        &settings.session_cookie_name,
                        value,
                        ttl,
                        settings.secure_cookies,
                    ));
                }
                Err(e) => tracing::error!(error = %e, "Session encoding failed"),
            }
        }
        jar
    }
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };
        Ok(Self::load(jar, &state.directory, state.auth.clone()))
    }
}

/// Access guard for protected handlers.
///
/// Runs before the handler body. Anonymous callers are redirected to the
/// login page with the requested path as `next`, and a warning notice is
/// queued for that page.
///
/// ```rust,ignore
/// async fn secret(Authenticated { session, identity }: Authenticated) -> Response {
///     ...
/// }
/// ```
pub struct Authenticated {
    pub session: SessionContext,
    pub identity: Arc<Identity>,
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = LoginRequired;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let mut session = match SessionContext::from_request_parts(parts, state).await {
            Ok(session) => session,
            Err(never) => match never {},
        };

        match session.require_identity() {
            Ok(identity) => Ok(Self { session, identity }),
            Err(e) => {
                let target = parts
                    .uri
                    .path_and_query()
                    .map_or("/", |pq| pq.as_str())
                    .to_string();
                tracing::debug!(path = %target, error = %e, "Redirecting to login");
                session.flash(FlashLevel::Warning, LOGIN_REQUIRED_MESSAGE);
                Err(LoginRequired {
                    jar: session.commit(),
                    location: login_location(&state.auth.login_path, &target),
                })
            }
        }
    }
}

/// Rejection of [`Authenticated`]: redirect to the login page.
pub struct LoginRequired {
    jar: PrivateCookieJar,
    location: String,
}

impl IntoResponse for LoginRequired {
    fn into_response(self) -> Response {
        (self.jar, Redirect::to(&self.location)).into_response()
    }
}

fn login_location(login_path: &str, next: &str) -> String {
    format!("{login_path}?next={}", urlencoding::encode(next))
}
