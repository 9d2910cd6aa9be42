use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Exam, Question};

pub(crate) const COLUMNS: &str = "\
    id, title, description, questions, groups, start_time, end_time, \
    points_per_question, created_at, updated_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams ORDER BY start_time DESC"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn list_for_group(pool: &PgPool, group: &str) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {COLUMNS} FROM exams WHERE $1 = ANY(groups) ORDER BY start_time"
    ))
    .bind(group)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct ExamFields<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub questions: &'a [Question],
    pub groups: &'a [String],
    pub start_time: PrimitiveDateTime,
    pub end_time: PrimitiveDateTime,
    pub points_per_question: i32,
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    fields: ExamFields<'_>,
    now: PrimitiveDateTime,
) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (
            id, title, description, questions, groups, start_time, end_time,
            points_per_question, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(fields.title)
    .bind(fields.description)
    .bind(Json(fields.questions))
    .bind(fields.groups)
    .bind(fields.start_time)
    .bind(fields.end_time)
    .bind(fields.points_per_question)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn replace(
    pool: &PgPool,
    id: &str,
    fields: ExamFields<'_>,
    now: PrimitiveDateTime,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams
         SET title = $1,
             description = $2,
             questions = $3,
             groups = $4,
             start_time = $5,
             end_time = $6,
             points_per_question = $7,
             updated_at = $8
         WHERE id = $9
         RETURNING {COLUMNS}",
    ))
    .bind(fields.title)
    .bind(fields.description)
    .bind(Json(fields.questions))
    .bind(fields.groups)
    .bind(fields.start_time)
    .bind(fields.end_time)
    .bind(fields.points_per_question)
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Submissions go with the exam through `ON DELETE CASCADE`.
pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
