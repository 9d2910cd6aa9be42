use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Group;

const COLUMNS: &str = "id, name, created_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(&format!("SELECT {COLUMNS} FROM groups ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn exists(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM groups WHERE name = $1)")
        .bind(name)
        .fetch_one(pool)
        .await
}

/// Returns `None` when a group with that name already exists.
pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    created_at: PrimitiveDateTime,
) -> Result<Option<Group>, sqlx::Error> {
    sqlx::query_as::<_, Group>(&format!(
        "INSERT INTO groups (id, name, created_at) VALUES ($1, $2, $3)
         ON CONFLICT (name) DO NOTHING
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(created_at)
    .fetch_optional(pool)
    .await
}

pub(crate) enum RenameOutcome {
    Renamed(Group),
    NotFound,
    NameTaken,
}

/// Renames a group; member students follow through `ON UPDATE CASCADE` in the same transaction.
pub(crate) async fn rename(pool: &PgPool, from: &str, to: &str) -> Result<RenameOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_scalar::<_, String>("SELECT id FROM groups WHERE name = $1 FOR UPDATE")
        .bind(from)
        .fetch_optional(&mut *tx)
        .await?;
    if current.is_none() {
        return Ok(RenameOutcome::NotFound);
    }

    if from != to {
        let taken: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM groups WHERE name = $1)")
            .bind(to)
            .fetch_one(&mut *tx)
            .await?;
        if taken {
            return Ok(RenameOutcome::NameTaken);
        }
    }

    let group = sqlx::query_as::<_, Group>(&format!(
        "UPDATE groups SET name = $1 WHERE name = $2 RETURNING {COLUMNS}"
    ))
    .bind(to)
    .bind(from)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE exams SET groups = array_replace(groups, $1, $2) WHERE $1 = ANY(groups)")
        .bind(from)
        .bind(to)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(RenameOutcome::Renamed(group))
}

pub(crate) enum DeleteOutcome {
    Deleted,
    NotFound,
    HasStudents,
}

pub(crate) async fn delete(pool: &PgPool, name: &str) -> Result<DeleteOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let found = sqlx::query_scalar::<_, String>("SELECT id FROM groups WHERE name = $1 FOR UPDATE")
        .bind(name)
        .fetch_optional(&mut *tx)
        .await?;
    if found.is_none() {
        return Ok(DeleteOutcome::NotFound);
    }

    let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE group_name = $1")
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;
    if members > 0 {
        return Ok(DeleteOutcome::HasStudents);
    }

    sqlx::query("DELETE FROM groups WHERE name = $1").bind(name).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(DeleteOutcome::Deleted)
}
