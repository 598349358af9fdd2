use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now;
use crate::error::{AppError, Result};
use crate::models::Journal;

pub async fn create(pool: &SqlitePool, name: &str, description: &str) -> Result<Journal> {
    let id = Uuid::new_v4();
    let now = now();

    sqlx::query(
        "INSERT INTO journals (id, name, description, active, created_at, updated_at) VALUES (?, ?, ?, 1, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    tracing::info!(journal_id = %id, name, "created journal");
    get(pool, id).await
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Journal> {
    let journal: Option<Journal> = sqlx::query_as("SELECT * FROM journals WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    journal.ok_or(AppError::JournalNotFound(id))
}

/// Most recently updated first.
pub async fn list(pool: &SqlitePool, active_only: bool) -> Result<Vec<Journal>> {
    let journals = sqlx::query_as(
        r#"
        SELECT * FROM journals
        WHERE active = 1 OR ? = 0
        ORDER BY updated_at DESC, rowid DESC
        "#,
    )
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    Ok(journals)
}

/// Replace name, description and the active flag.
pub async fn update(
    pool: &SqlitePool,
    id: Uuid,
    name: &str,
    description: &str,
    active: bool,
) -> Result<Journal> {
    let result = sqlx::query(
        "UPDATE journals SET name = ?, description = ?, active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(name)
    .bind(description)
    .bind(active)
    .bind(now())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::JournalNotFound(id));
    }

    get(pool, id).await
}

/// Hard delete. Entries and their tag links go with it.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM journals WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::JournalNotFound(id));
    }

    tracing::info!(journal_id = %id, "deleted journal");
    Ok(())
}

pub async fn delete_inactive(pool: &SqlitePool) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM journals WHERE active = 0")
        .execute(pool)
        .await?
        .rows_affected();

    tracing::info!(removed, "deleted inactive journals");
    Ok(removed)
}
