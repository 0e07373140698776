use axum::Form;
use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use serde_json::json;

use crate::auth::SessionContext;
use crate::phone;
use crate::render::render_page;
use crate::state::AppState;

const TITLE: &str = "Phone number validation";

#[derive(Deserialize)]
pub(super) struct PhoneForm {
    #[serde(default)]
    phone: String,
}

pub(super) async fn phone_form(State(state): State<AppState>, session: SessionContext) -> Response {
    render_page(&state, session, "phone_validation", json!({ "title": TITLE }))
}

pub(super) async fn phone_submit(
    State(state): State<AppState>,
    session: SessionContext,
    Form(form): Form<PhoneForm>,
) -> Response {
    let (formatted, error) = match phone::normalize(&form.phone) {
        Ok(formatted) => (Some(formatted), None),
        Err(e) => {
            tracing::debug!(error = %e, "Phone number rejected");
            (None, Some(e.to_string()))
        }
    };
    render_page(
        &state,
        session,
        "phone_validation",
        json!({
            "title": TITLE,
            "phone": form.phone,
            "formatted_phone": formatted,
            "error": error,
        }),
    )
}
