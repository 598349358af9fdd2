use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::now;
use crate::error::{AppError, Result};
use crate::models::{Tag, TagUsage};
use crate::store::{entry_exists, journal_exists};

pub(crate) fn label(name: &str) -> Result<&str> {
    Tag::normalize(name).ok_or_else(|| AppError::validation("tag must not be empty"))
}

/// Create the tag if needed and link it to the entry, on a connection the
/// caller already holds a transaction on.
pub(crate) async fn link(conn: &mut SqliteConnection, entry_id: Uuid, name: &str, now: &str) -> Result<()> {
    sqlx::query(
        "INSERT INTO tags (tag, created_at, updated_at) VALUES (?, ?, ?) ON CONFLICT(tag) DO NOTHING",
    )
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO entry_tags (entry_id, tag, created_at) VALUES (?, ?, ?)")
        .bind(entry_id.to_string())
        .bind(name)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Attach `name` to the entry, creating the tag first if needed. Attaching
/// a tag that is already there does nothing.
pub async fn attach(pool: &SqlitePool, entry_id: Uuid, name: &str) -> Result<()> {
    let name = label(name)?;
    let now = now();
    let mut tx = pool.begin().await?;

    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM entries WHERE id = ?")
        .bind(entry_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

    if found.is_none() {
        return Err(AppError::EntryNotFound(entry_id));
    }

    link(&mut tx, entry_id, name, &now).await?;
    tx.commit().await?;

    tracing::debug!(entry_id = %entry_id, tag = name, "attached tag");
    Ok(())
}

/// Remove the link between the entry and `name`. The tag itself stays.
pub async fn detach(pool: &SqlitePool, entry_id: Uuid, name: &str) -> Result<()> {
    let name = label(name)?;
    entry_exists(pool, entry_id).await?;

    let result = sqlx::query("DELETE FROM entry_tags WHERE entry_id = ? AND tag = ?")
        .bind(entry_id.to_string())
        .bind(name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::TagNotFound(name.to_string()));
    }

    tracing::debug!(entry_id = %entry_id, tag = name, "detached tag");
    Ok(())
}

/// Tags on one entry, alphabetical.
pub async fn list_for_entry(pool: &SqlitePool, entry_id: Uuid) -> Result<Vec<Tag>> {
    entry_exists(pool, entry_id).await?;

    let tags = sqlx::query_as(
        r#"
        SELECT t.* FROM tags t
        JOIN entry_tags et ON et.tag = t.tag
        WHERE et.entry_id = ?
        ORDER BY t.tag ASC
        "#,
    )
    .bind(entry_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Distinct tags used by any entry of the journal, soft-deleted entries
/// included, alphabetical.
pub async fn list_for_journal(pool: &SqlitePool, journal_id: Uuid) -> Result<Vec<Tag>> {
    journal_exists(pool, journal_id).await?;

    let tags = sqlx::query_as(
        r#"
        SELECT DISTINCT t.* FROM tags t
        JOIN entry_tags et ON et.tag = t.tag
        JOIN entries e ON e.id = et.entry_id
        WHERE e.journal_id = ?
        ORDER BY t.tag ASC
        "#,
    )
    .bind(journal_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// The whole vocabulary with usage counts, alphabetical.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<TagUsage>> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.tag, COUNT(et.entry_id) AS entry_count
        FROM tags t
        LEFT JOIN entry_tags et ON et.tag = t.tag
        GROUP BY t.tag
        ORDER BY t.tag ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Delete the tag and every link to it.
pub async fn delete(pool: &SqlitePool, name: &str) -> Result<()> {
    let name = label(name)?;
    let result = sqlx::query("DELETE FROM tags WHERE tag = ?")
        .bind(name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::TagNotFound(name.to_string()));
    }

    tracing::info!(tag = name, "deleted tag");
    Ok(())
}
