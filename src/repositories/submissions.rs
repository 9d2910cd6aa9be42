use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{AnswerMap, CheatingReport, Submission};

const COLUMNS: &str = "id, exam_id, student_id, answers, submitted_at, cheating_detected, score";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions ORDER BY submitted_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_exam(pool: &PgPool, exam_id: &str) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE exam_id = $1 ORDER BY submitted_at"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_exam_and_student(
    pool: &PgPool,
    exam_id: &str,
    student_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {COLUMNS} FROM submissions WHERE exam_id = $1 AND student_id = $2"
    ))
    .bind(exam_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateSubmission<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub student_id: &'a str,
    pub answers: &'a AnswerMap,
    pub submitted_at: PrimitiveDateTime,
    pub cheating_detected: bool,
    pub score: i32,
}

/// Inserts the submission unless one already exists for the same exam and
/// student. Returns the stored row and whether it was created by this call.
pub(crate) async fn create_once(
    pool: &PgPool,
    params: CreateSubmission<'_>,
) -> Result<(Submission, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, Submission>(&format!(
        "INSERT INTO submissions (
            id, exam_id, student_id, answers, submitted_at, cheating_detected, score
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        ON CONFLICT (exam_id, student_id) DO NOTHING
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.student_id)
    .bind(Json(params.answers))
    .bind(params.submitted_at)
    .bind(params.cheating_detected)
    .bind(params.score)
    .fetch_optional(pool)
    .await?;

    if let Some(submission) = inserted {
        return Ok((submission, true));
    }

    let existing = find_by_exam_and_student(pool, params.exam_id, params.student_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok((existing, false))
}

pub(crate) async fn list_cheating_reports(pool: &PgPool) -> Result<Vec<CheatingReport>, sqlx::Error> {
    sqlx::query_as::<_, CheatingReport>(
        "SELECT s.id,
                st.name AS student_name,
                st.surname AS student_surname,
                st.group_name,
                e.title AS exam_title,
                s.submitted_at
         FROM submissions s
         JOIN students st ON st.id = s.student_id
         JOIN exams e ON e.id = s.exam_id
         WHERE s.cheating_detected
         ORDER BY s.submitted_at DESC",
    )
    .fetch_all(pool)
    .await
}

/// Returns false when no flagged submission has that id.
pub(crate) async fn clear_cheating_flag(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE submissions SET cheating_detected = FALSE WHERE id = $1 AND cheating_detected",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
