use crate::models::NewContact;
use crate::services::contact;
use crate::web::error::ApiResult;
use crate::web::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde_json::json;
use std::sync::Arc;

/// POST /api/v1/contact
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewContact>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let contact = contact::submit_contact(&state.db, &input)?;
    tracing::info!(contact_id = contact.id, "contact submission stored");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Thanks for sending your details, we will get back to you soon",
            "contact": contact,
        })),
    ))
}
