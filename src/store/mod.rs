//! CRUD over journals, entries and tags. Every function goes straight to
//! storage; nothing is cached between calls.

pub mod entries;
pub mod journals;
pub mod tags;

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub(crate) async fn journal_exists(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM journals WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    found.map(|_| ()).ok_or(AppError::JournalNotFound(id))
}

pub(crate) async fn entry_exists(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM entries WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    found.map(|_| ()).ok_or(AppError::EntryNotFound(id))
}
