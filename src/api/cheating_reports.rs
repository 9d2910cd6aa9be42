use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::submission::CheatingReportResponse;
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reports))
        .route("/:submission_id", delete(clear_flag))
}

async fn list_reports(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<CheatingReportResponse>>, ApiError> {
    let reports = repositories::submissions::list_cheating_reports(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list cheating reports"))?;

    Ok(Json(reports.into_iter().map(CheatingReportResponse::from).collect()))
}

async fn clear_flag(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(submission_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let cleared = repositories::submissions::clear_cheating_flag(state.db(), &submission_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to clear cheating flag"))?;

    if !cleared {
        return Err(ApiError::NotFound("Cheating report not found".to_string()));
    }

    metrics::record_cheating_flag_cleared();
    tracing::info!(submission_id = %submission_id, "Cheating flag cleared");
    Ok(Json(MessageResponse::new("Cheating flag removed")))
}
