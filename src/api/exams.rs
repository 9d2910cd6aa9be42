use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentPrincipal, CurrentTeacher};
use crate::api::validation::validate_exam_payload;
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::Exam;
use crate::repositories;
use crate::schemas::exam::{ExamPayload, ExamResponse, ExamResultsResponse};
use crate::schemas::MessageResponse;
use crate::services::{exam_window, results};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exams).post(create_exam))
        .route("/:exam_id", get(get_exam).put(update_exam).delete(delete_exam))
        .route("/:exam_id/results", get(exam_results))
}

fn teacher_view(exam: &Exam) -> ExamResponse {
    let status = exam_window::exam_status(exam.start_time, exam.end_time, primitive_now_utc());
    ExamResponse::for_teacher(exam, status)
}

pub(crate) async fn load_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

fn exam_fields(payload: &ExamPayload) -> repositories::exams::ExamFields<'_> {
    repositories::exams::ExamFields {
        title: payload.title.trim(),
        description: payload.description.trim(),
        questions: &payload.questions,
        groups: &payload.groups,
        start_time: to_primitive_utc(payload.start_time),
        end_time: to_primitive_utc(payload.end_time),
        points_per_question: payload.points_per_question,
    }
}

async fn list_exams(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let exams = repositories::exams::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(exams.iter().map(teacher_view).collect()))
}

async fn create_exam(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<ExamPayload>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    validate_exam_payload(&payload)?;

    let exam_id = Uuid::new_v4().to_string();
    let exam = repositories::exams::create(state.db(), &exam_id, exam_fields(&payload), primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    tracing::info!(exam_id = %exam.id, questions = exam.questions.0.len(), "Exam created");
    Ok((StatusCode::CREATED, Json(teacher_view(&exam))))
}

async fn get_exam(
    principal: CurrentPrincipal,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;

    match principal {
        CurrentPrincipal::Teacher(_) => Ok(Json(teacher_view(&exam))),
        CurrentPrincipal::Student(student) => {
            if !exam.is_assigned_to(&student.group_name) {
                return Err(ApiError::Forbidden("Exam is not assigned to your group"));
            }
            let status = exam_window::exam_status(exam.start_time, exam.end_time, primitive_now_utc());
            Ok(Json(ExamResponse::for_student(&exam, status)))
        }
    }
}

async fn update_exam(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
    Json(payload): Json<ExamPayload>,
) -> Result<Json<ExamResponse>, ApiError> {
    validate_exam_payload(&payload)?;

    let exam = repositories::exams::replace(state.db(), &exam_id, exam_fields(&payload), primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(teacher_view(&exam)))
}

async fn delete_exam(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    tracing::info!(exam_id = %exam_id, "Exam deleted with its submissions");
    Ok(Json(MessageResponse::new("Exam deleted successfully")))
}

async fn exam_results(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamResultsResponse>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;

    let submissions = repositories::submissions::list_by_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;
    let students: HashMap<_, _> = repositories::students::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?
        .into_iter()
        .map(|student| (student.id.clone(), student))
        .collect();

    Ok(Json(results::build_results(&exam, submissions, &students)))
}
