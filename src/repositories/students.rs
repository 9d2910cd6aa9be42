use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Student;
use crate::db::types::StudentStatus;

const COLUMNS: &str = "\
    id, name, surname, email, hashed_password, group_name, class_name, \
    parent_contact, status, created_at, updated_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students ORDER BY group_name, surname, name"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM students").fetch_one(pool).await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE lower(email) = lower($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn email_taken(
    pool: &PgPool,
    email: &str,
    except_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (
            SELECT 1 FROM students
            WHERE lower(email) = lower($1) AND ($2::text IS NULL OR id <> $2)
        )",
    )
    .bind(email)
    .bind(except_id)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateStudent<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub surname: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
    pub group_name: &'a str,
    pub class_name: &'a str,
    pub parent_contact: &'a str,
    pub status: StudentStatus,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateStudent<'_>) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (
            id, name, surname, email, hashed_password, group_name, class_name,
            parent_contact, status, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$10)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.surname)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.group_name)
    .bind(params.class_name)
    .bind(params.parent_contact)
    .bind(params.status)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateStudent<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub email: &'a str,
    /// `None` keeps the stored hash.
    pub hashed_password: Option<String>,
    pub group_name: &'a str,
    pub class_name: &'a str,
    pub parent_contact: &'a str,
    pub status: StudentStatus,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateStudent<'_>,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "UPDATE students
         SET name = $1,
             surname = $2,
             email = $3,
             hashed_password = COALESCE($4, hashed_password),
             group_name = $5,
             class_name = $6,
             parent_contact = $7,
             status = $8,
             updated_at = $9
         WHERE id = $10
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.surname)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.group_name)
    .bind(params.class_name)
    .bind(params.parent_contact)
    .bind(params.status)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
