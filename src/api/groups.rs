use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::groups::{DeleteOutcome, RenameOutcome};
use crate::schemas::group::{GroupPayload, GroupResponse};
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/:group_name", put(rename_group).delete(delete_group))
}

async fn list_groups(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let groups = repositories::groups::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list groups"))?;

    Ok(Json(groups.into_iter().map(|group| group.name).collect()))
}

async fn create_group(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<GroupPayload>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    payload.validate()?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("group name must not be empty".to_string()));
    }

    let group = repositories::groups::create(state.db(), &Uuid::new_v4().to_string(), name, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create group"))?
        .ok_or_else(|| ApiError::Conflict("Group already exists".to_string()))?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

async fn rename_group(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(group_name): Path<String>,
    Json(payload): Json<GroupPayload>,
) -> Result<Json<GroupResponse>, ApiError> {
    payload.validate()?;
    let new_name = payload.name.trim();
    if new_name.is_empty() {
        return Err(ApiError::BadRequest("group name must not be empty".to_string()));
    }

    let outcome = repositories::groups::rename(state.db(), &group_name, new_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to rename group"))?;

    match outcome {
        RenameOutcome::Renamed(group) => {
            tracing::info!(from = %group_name, to = %group.name, "Group renamed");
            Ok(Json(GroupResponse::from(group)))
        }
        RenameOutcome::NotFound => Err(ApiError::NotFound("Group not found".to_string())),
        RenameOutcome::NameTaken => Err(ApiError::Conflict("Group already exists".to_string())),
    }
}

async fn delete_group(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(group_name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let outcome = repositories::groups::delete(state.db(), &group_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete group"))?;

    match outcome {
        DeleteOutcome::Deleted => Ok(Json(MessageResponse::new("Group deleted successfully"))),
        DeleteOutcome::NotFound => Err(ApiError::NotFound("Group not found".to_string())),
        DeleteOutcome::HasStudents => {
            Err(ApiError::BadRequest("Cannot delete group with students".to_string()))
        }
    }
}
