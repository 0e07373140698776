//! Site pages outside the login flow.

mod blog;
mod inspect;
mod site;
mod validation;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;

use crate::state::AppState;

/// Routes for every public and protected page.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(site::index))
        .route("/about", get(site::about))
        .route("/counter", get(site::counter))
        .route("/secret", get(site::secret))
        .route("/posts", get(blog::posts))
        .route("/posts/{index}", get(blog::post))
        .route("/url-params", get(inspect::url_params))
        .route("/headers", get(inspect::headers))
        .route(
            "/cookies",
            get(inspect::cookies).post(inspect::cookies_action),
        )
        .route(
            "/form_params",
            get(inspect::form_params).post(inspect::form_params_submit),
        )
        .route(
            "/phone_validation",
            get(validation::phone_form).post(validation::phone_submit),
        )
}

/// Plain-text 404, also used as the router fallback.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}
