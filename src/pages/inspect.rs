//! Pages that echo parts of the request back.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use crate::auth::SessionContext;
use crate::render::render_page;
use crate::state::AppState;

const DEMO_COOKIE: &str = "my_cookie";
const DEMO_COOKIE_VALUE: &str = "cookie_value";

// ── URL params ─────────────────────────────────────────────────────

pub(super) async fn url_params(
    State(state): State<AppState>,
    session: SessionContext,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    render_page(
        &state,
        session,
        "url_params",
        json!({ "title": "URL parameters", "params": params }),
    )
}

// ── Headers ────────────────────────────────────────────────────────

pub(super) async fn headers(
    State(state): State<AppState>,
    session: SessionContext,
    headers: HeaderMap,
) -> Response {
    let pairs: Vec<(String, String)> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    render_page(
        &state,
        session,
        "headers",
        json!({ "title": "Request headers", "headers": pairs }),
    )
}

// ── Cookies ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct CookieAction {
    action: Option<String>,
}

pub(super) async fn cookies(
    State(state): State<AppState>,
    session: SessionContext,
    jar: CookieJar,
) -> Response {
    cookie_page(&state, session, &jar)
}

pub(super) async fn cookies_action(
    State(state): State<AppState>,
    session: SessionContext,
    jar: CookieJar,
    Form(form): Form<CookieAction>,
) -> Response {
    match form.action.as_deref() {
        Some("set") => {
            let cookie = Cookie::build((DEMO_COOKIE, DEMO_COOKIE_VALUE))
                .path("/")
                .max_age(Duration::days(1));
            (jar.add(cookie), Redirect::to("/cookies")).into_response()
        }
        Some("delete") => {
            let cookie = Cookie::build(DEMO_COOKIE).path("/");
            (jar.remove(cookie), Redirect::to("/cookies")).into_response()
        }
        _ => cookie_page(&state, session, &jar),
    }
}

fn cookie_page(state: &AppState, session: SessionContext, jar: &CookieJar) -> Response {
    let cookie_set = jar.get(DEMO_COOKIE).is_some();
    let message = if cookie_set {
        "Cookie is set."
    } else {
        "Cookie is not set."
    };
    render_page(
        state,
        session,
        "cookies",
        json!({ "title": "Cookie", "message": message, "cookie_set": cookie_set }),
    )
}

// ── Form params ────────────────────────────────────────────────────

pub(super) async fn form_params(
    State(state): State<AppState>,
    session: SessionContext,
) -> Response {
    let empty: [(String, String); 0] = [];
    render_form_params(&state, session, &empty)
}

pub(super) async fn form_params_submit(
    State(state): State<AppState>,
    session: SessionContext,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    render_form_params(&state, session, &fields)
}

fn render_form_params(
    state: &AppState,
    session: SessionContext,
    fields: &[(String, String)],
) -> Response {
    render_page(
        state,
        session,
        "form_params",
        json!({ "title": "Form parameters", "form_data": fields }),
    )
}
