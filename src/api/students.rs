use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStudent, CurrentTeacher};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::student::{StudentCreate, StudentExamEntry, StudentResponse, StudentUpdate};
use crate::schemas::MessageResponse;
use crate::services::exam_window::{self, OwnSubmission};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/me", get(me))
        .route("/me/exams", get(my_exams))
        .route("/:student_id", put(update_student).delete(delete_student))
}

async fn ensure_group_exists(state: &AppState, group: &str) -> Result<(), ApiError> {
    let exists = repositories::groups::exists(state.db(), group)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check group"))?;

    if exists {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Group '{group}' does not exist")))
    }
}

async fn ensure_email_free(state: &AppState, email: &str, except_id: Option<&str>) -> Result<(), ApiError> {
    let taken = repositories::students::email_taken(state.db(), email, except_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check student login"))?;

    if taken {
        Err(ApiError::Conflict("A student with this login already exists".to_string()))
    } else {
        Ok(())
    }
}

async fn list_students(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = repositories::students::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    Ok(Json(students.into_iter().map(StudentResponse::from).collect()))
}

async fn create_student(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    payload.validate()?;
    let email = payload.email.trim();
    ensure_group_exists(&state, &payload.group).await?;
    ensure_email_free(&state, email, None).await?;

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let student = repositories::students::create(
        state.db(),
        repositories::students::CreateStudent {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            surname: payload.surname.trim(),
            email,
            hashed_password,
            group_name: &payload.group,
            class_name: payload.class_name.trim(),
            parent_contact: payload.parent_contact.trim(),
            status: payload.status,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create student"))?;

    tracing::info!(student_id = %student.id, group = %student.group_name, "Student created");
    Ok((StatusCode::CREATED, Json(StudentResponse::from(student))))
}

async fn update_student(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(payload): Json<StudentUpdate>,
) -> Result<Json<StudentResponse>, ApiError> {
    payload.validate()?;
    let email = payload.email.trim();
    ensure_group_exists(&state, &payload.group).await?;
    ensure_email_free(&state, email, Some(&student_id)).await?;

    let hashed_password = payload
        .password
        .as_deref()
        .map(security::hash_password)
        .transpose()
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let student = repositories::students::update(
        state.db(),
        &student_id,
        repositories::students::UpdateStudent {
            name: payload.name.trim(),
            surname: payload.surname.trim(),
            email,
            hashed_password,
            group_name: &payload.group,
            class_name: payload.class_name.trim(),
            parent_contact: payload.parent_contact.trim(),
            status: payload.status,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update student"))?
    .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    Ok(Json(StudentResponse::from(student)))
}

async fn delete_student(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::students::delete_by_id(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete student"))?;

    if !deleted {
        return Err(ApiError::NotFound("Student not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

async fn me(CurrentStudent(student): CurrentStudent) -> Json<StudentResponse> {
    Json(StudentResponse::from(student))
}

async fn my_exams(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentExamEntry>>, ApiError> {
    let exams = repositories::exams::list_for_group(state.db(), &student.group_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let own: HashMap<String, OwnSubmission> =
        repositories::submissions::list_by_student(state.db(), &student.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?
            .into_iter()
            .map(|submission| {
                let own = if submission.cheating_detected {
                    OwnSubmission::Flagged
                } else {
                    OwnSubmission::Clean
                };
                (submission.exam_id, own)
            })
            .collect();

    let now = primitive_now_utc();
    let entries = exams
        .iter()
        .map(|exam| {
            let own = own.get(&exam.id).copied().unwrap_or(OwnSubmission::None);
            let status = exam_window::student_exam_status(exam.start_time, exam.end_time, now, own);
            StudentExamEntry::new(exam, status)
        })
        .collect();

    Ok(Json(entries))
}
