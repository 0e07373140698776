use axum::Form;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use serde::Deserialize;
use serde_json::json;

use super::config::AuthSettings;
use super::extractor::{Authenticated, SessionContext};
use crate::render::render_page;
use crate::state::AppState;
use crate::types::FlashLevel;

const LOGIN_TITLE: &str = "Log in";

/// Login and logout routes.
pub fn auth_routes(settings: &AuthSettings) -> Router<AppState> {
    Router::new()
        .route(&settings.login_path, get(login_form).post(login))
        .route(&settings.logout_path, get(logout))
}

// ── Login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NextParams {
    next: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    login: String,
    #[serde(default)]
    password: String,
    remember: Option<String>,
}

async fn login_form(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<NextParams>,
) -> Response {
    let next = params.next.as_deref().and_then(safe_next);
    render_page(
        &state,
        session,
        "login",
        json!({ "title": LOGIN_TITLE, "next": next, "login": "" }),
    )
}

async fn login(
    State(state): State<AppState>,
    mut session: SessionContext,
    Query(params): Query<NextParams>,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = params.next.as_deref().and_then(safe_next);

    match state.directory.authenticate(&form.login, &form.password) {
        Ok(identity) => {
            let remember = form.remember.is_some_and(|v| !v.is_empty());
            tracing::info!(login = %identity.login, remember, "Login successful");
            session.login(identity, remember);
            session.flash(FlashLevel::Success, "You have logged in successfully.");
            let target = next.unwrap_or(state.auth.login_redirect.as_str());
            (session.commit(), Redirect::to(target)).into_response()
        }
        Err(e) => {
            tracing::warn!(login = %form.login, error = %e, "Login failed");
            session.flash(FlashLevel::Error, "Invalid login or password.");
            render_page(
                &state,
                session,
                "login",
                json!({ "title": LOGIN_TITLE, "next": next, "login": form.login }),
            )
        }
    }
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(
    State(state): State<AppState>,
    Authenticated {
        mut session,
        identity,
    }: Authenticated,
) -> Response {
    session.logout();
    session.flash(FlashLevel::Info, "You have logged out.");
    tracing::info!(login = %identity.login, "Logout");
    (session.commit(), Redirect::to(&state.auth.logout_redirect)).into_response()
}

// ── Helpers ────────────────────────────────────────────────────────

/// Accept only same-site absolute paths as a post-login target.
fn safe_next(next: &str) -> Option<&str> {
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);
    local.then_some(next)
}
