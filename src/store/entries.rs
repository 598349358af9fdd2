use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::now;
use crate::error::{AppError, Result};
use crate::models::{DEFAULT_CONTENT_TYPE, Entry, EntryPatch};
use crate::store::{journal_exists, tags};

/// Create an entry under an existing journal. An empty `content_type`
/// becomes `text/plain`.
pub async fn create(
    pool: &SqlitePool,
    journal_id: Uuid,
    title: &str,
    content: &str,
    content_type: &str,
) -> Result<Entry> {
    create_with_tags(pool, journal_id, title, content, content_type, &[]).await
}

/// [`create`] plus attaching `labels`, in one transaction: either the entry
/// exists with every label or nothing was written.
pub async fn create_with_tags(
    pool: &SqlitePool,
    journal_id: Uuid,
    title: &str,
    content: &str,
    content_type: &str,
    labels: &[String],
) -> Result<Entry> {
    let labels = labels
        .iter()
        .map(|l| tags::label(l))
        .collect::<Result<Vec<_>>>()?;

    let id = Uuid::new_v4();
    let now = now();
    let content_type = if content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        content_type
    };

    let mut tx = pool.begin().await?;

    // Inserts nothing when the journal is missing.
    let result = sqlx::query(
        r#"
        INSERT INTO entries (id, journal_id, title, content, content_type, deleted, created_at, updated_at)
        SELECT ?, id, ?, ?, ?, 0, ?, ? FROM journals WHERE id = ?
        "#,
    )
    .bind(id.to_string())
    .bind(title)
    .bind(content)
    .bind(content_type)
    .bind(&now)
    .bind(&now)
    .bind(journal_id.to_string())
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::JournalNotFound(journal_id));
    }

    for label in &labels {
        tags::link(&mut tx, id, label, &now).await?;
    }

    tx.commit().await?;

    tracing::info!(entry_id = %id, journal_id = %journal_id, tags = labels.len(), "created entry");
    get(pool, id).await
}

/// Fetch by id, soft-deleted or not.
pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Entry> {
    let entry: Option<Entry> = sqlx::query_as("SELECT * FROM entries WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    entry.ok_or(AppError::EntryNotFound(id))
}

pub async fn list(pool: &SqlitePool, journal_id: Uuid, include_deleted: bool) -> Result<Vec<Entry>> {
    journal_exists(pool, journal_id).await?;

    let entries = sqlx::query_as(
        r#"
        SELECT * FROM entries
        WHERE journal_id = ? AND (deleted = 0 OR ? = 1)
        ORDER BY updated_at DESC, seq DESC
        "#,
    )
    .bind(journal_id.to_string())
    .bind(include_deleted)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

/// Partial update; always refreshes `updated_at`.
pub async fn update(pool: &SqlitePool, id: Uuid, patch: &EntryPatch) -> Result<Entry> {
    let result = sqlx::query(
        r#"
        UPDATE entries SET
            title = COALESCE(?, title),
            content = COALESCE(?, content),
            content_type = COALESCE(?, content_type),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(patch.title())
    .bind(patch.content())
    .bind(patch.content_type())
    .bind(now())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::EntryNotFound(id));
    }

    get(pool, id).await
}

/// Soft delete: the row stays, hidden from default listings and search,
/// until [`purge_deleted`] removes it.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let result = sqlx::query("UPDATE entries SET deleted = 1, updated_at = ? WHERE id = ?")
        .bind(now())
        .bind(id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::EntryNotFound(id));
    }

    tracing::info!(entry_id = %id, "soft-deleted entry");
    Ok(())
}

/// Hard-delete the journal's soft-deleted entries.
pub async fn purge_deleted(pool: &SqlitePool, journal_id: Uuid) -> Result<u64> {
    journal_exists(pool, journal_id).await?;

    let purged = sqlx::query("DELETE FROM entries WHERE journal_id = ? AND deleted = 1")
        .bind(journal_id.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    tracing::info!(journal_id = %journal_id, purged, "purged deleted entries");
    Ok(purged)
}

/// Hard-delete every entry of the journal, deleted or not.
pub async fn delete_all_in_journal(pool: &SqlitePool, journal_id: Uuid) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM entries WHERE journal_id = ?")
        .bind(journal_id.to_string())
        .execute(pool)
        .await?
        .rows_affected();

    tracing::info!(journal_id = %journal_id, removed, "deleted all entries in journal");
    Ok(removed)
}
