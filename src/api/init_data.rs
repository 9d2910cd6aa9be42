use axum::{extract::State, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::schemas::MessageResponse;
use crate::services::demo_data;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(init_data))
}

async fn init_data(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let seeded = demo_data::seed_if_empty(&state)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to seed demo data"))?;

    let message = if seeded { "Data initialized successfully" } else { "Data already initialized" };
    Ok(Json(MessageResponse::new(message)))
}
