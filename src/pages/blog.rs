use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::json;

use super::not_found;
use crate::auth::SessionContext;
use crate::render::render_page;
use crate::state::AppState;

pub(super) async fn posts(State(state): State<AppState>, session: SessionContext) -> Response {
    render_page(
        &state,
        session,
        "posts",
        json!({ "title": "Posts", "posts": state.posts.as_slice() }),
    )
}

// Negative and non-numeric indexes fail to parse and get the same 404 as
// indexes past the end.
pub(super) async fn post(
    State(state): State<AppState>,
    session: SessionContext,
    Path(index): Path<String>,
) -> Response {
    let Some(post) = index
        .parse::<usize>()
        .ok()
        .and_then(|i| state.posts.get(i))
    else {
        return not_found().await;
    };
    render_page(
        &state,
        session,
        "post",
        json!({ "title": post.title, "post": post }),
    )
}
