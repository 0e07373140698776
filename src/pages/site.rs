use axum::extract::State;
use axum::response::Response;
use serde_json::json;

use crate::auth::{Authenticated, SessionContext};
use crate::render::render_page;
use crate::state::AppState;

pub(super) async fn index(State(state): State<AppState>, session: SessionContext) -> Response {
    render_page(&state, session, "index", json!({ "title": "Home" }))
}

pub(super) async fn about(State(state): State<AppState>, session: SessionContext) -> Response {
    render_page(&state, session, "about", json!({ "title": "About the author" }))
}

pub(super) async fn counter(
    State(state): State<AppState>,
    mut session: SessionContext,
) -> Response {
    let count = state.counter.record_visit(session.caller());
    render_page(
        &state,
        session,
        "counter",
        json!({ "title": "Visit counter", "count": count }),
    )
}

pub(super) async fn secret(
    State(state): State<AppState>,
    Authenticated { session, identity }: Authenticated,
) -> Response {
    render_page(
        &state,
        session,
        "secret",
        json!({ "title": "Secret page", "display_name": identity.display_name }),
    )
}
