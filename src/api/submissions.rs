use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::exams::load_exam;
use crate::api::guards::{CurrentStudent, CurrentTeacher};
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::submission::{SubmissionCreate, SubmissionResponse};
use crate::services::{exam_window, scoring};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions).post(create_submission))
        .route("/exam/:exam_id", get(list_exam_submissions))
}

async fn list_submissions(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = repositories::submissions::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from).collect()))
}

async fn list_exam_submissions(
    CurrentTeacher(_): CurrentTeacher,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let submissions = repositories::submissions::list_by_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    Ok(Json(submissions.into_iter().map(SubmissionResponse::from).collect()))
}

/// Idempotent per exam and student: a repeat returns the stored submission with 200.
async fn create_submission(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<SubmissionCreate>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    if payload.student_id != student.id {
        return Err(ApiError::Forbidden("Cannot submit on behalf of another student"));
    }

    let exam = load_exam(&state, &payload.exam_id).await?;
    if !exam.is_assigned_to(&student.group_name) {
        return Err(ApiError::Forbidden("Exam is not assigned to your group"));
    }

    let now = primitive_now_utc();
    exam_window::check_submit_window(
        exam.start_time,
        exam.end_time,
        now,
        state.settings().exam().submit_grace_seconds,
    )
    .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let score = scoring::score_answers(&exam.questions.0, &payload.answers, exam.points_per_question);

    let (submission, created) = repositories::submissions::create_once(
        state.db(),
        repositories::submissions::CreateSubmission {
            id: &Uuid::new_v4().to_string(),
            exam_id: &exam.id,
            student_id: &student.id,
            answers: &payload.answers,
            submitted_at: now,
            cheating_detected: payload.cheating_detected,
            score: score.points,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create submission"))?;

    if created {
        metrics::record_submission_created(submission.cheating_detected);
        tracing::info!(
            exam_id = %exam.id,
            student_id = %student.id,
            score = submission.score,
            cheating_detected = submission.cheating_detected,
            client_submitted_at = ?payload.submitted_at,
            "Submission recorded"
        );
        Ok((StatusCode::CREATED, Json(SubmissionResponse::from(submission))))
    } else {
        tracing::info!(exam_id = %exam.id, student_id = %student.id, "Duplicate submission ignored");
        Ok((StatusCode::OK, Json(SubmissionResponse::from(submission))))
    }
}

#[cfg(test)]
mod tests;
