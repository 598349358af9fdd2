//! Table layout and the per-component version record.
//!
//! Only two transitions are legal: a fresh store (version 0) is initialized
//! straight to the target, and a store already at the target is left alone.
//! Anything else is refused without touching the file.

use sqlx::SqlitePool;

use crate::db::now;
use crate::error::{AppError, Result};

pub const COMPONENT: &str = "mnemo";
pub const SCHEMA_VERSION: i64 = 1;

const VERSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS versions (
    component TEXT PRIMARY KEY NOT NULL,
    version INTEGER NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

const CORE_TABLES: &str = include_str!("../migrations/001_core.sql");

/// Recorded version for `component`, or 0 when the store (or the component)
/// has never been initialized.
pub async fn current_version(pool: &SqlitePool, component: &str) -> Result<i64> {
    let (has_table,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'versions'",
    )
    .fetch_one(pool)
    .await?;

    if has_table == 0 {
        return Ok(0);
    }

    let version: Option<(i64,)> =
        sqlx::query_as("SELECT version FROM versions WHERE component = ?")
            .bind(component)
            .fetch_optional(pool)
            .await?;

    Ok(version.map(|(v,)| v).unwrap_or(0))
}

/// Create every table, index and trigger and record `target` for
/// `component`, all in one transaction.
///
/// The version row is claimed first, so of two callers racing on a fresh
/// store only one gets to initialize it. A store that already records a
/// version is left alone: the call succeeds only if that version equals
/// `target`.
pub async fn initialize(pool: &SqlitePool, component: &str, target: i64) -> Result<()> {
    sqlx::raw_sql(VERSIONS_TABLE).execute(pool).await?;

    // The first statement is a write, so the transaction takes the write lock
    // before it reads anything.
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query(
        r#"
        INSERT INTO versions (component, version, updated_at) VALUES (?, ?, ?)
        ON CONFLICT(component) DO NOTHING
        "#,
    )
    .bind(component)
    .bind(target)
    .bind(now())
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        let (current,): (i64,) = sqlx::query_as("SELECT version FROM versions WHERE component = ?")
            .bind(component)
            .fetch_one(&mut *tx)
            .await?;
        tx.rollback().await?;

        if current == target {
            tracing::debug!(component, version = current, "schema is current");
            return Ok(());
        }

        tracing::warn!(component, current, target, "schema initialize blocked");
        return Err(AppError::MigrationBlocked {
            component: component.to_string(),
            current,
            target,
        });
    }

    sqlx::raw_sql(CORE_TABLES).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!(component, version = target, "initialized schema");
    Ok(())
}

/// Bring `component` to `target`, or refuse.
pub async fn upgrade(pool: &SqlitePool, component: &str, target: i64) -> Result<()> {
    if target < 1 {
        return Err(AppError::validation(format!(
            "schema version must be positive, got {target}"
        )));
    }

    let current = current_version(pool, component).await?;

    // Another caller may initialize between this read and the write;
    // `initialize` re-checks under the write lock.
    if current == 0 {
        return initialize(pool, component, target).await;
    }

    if current == target {
        tracing::debug!(component, version = current, "schema is current");
        return Ok(());
    }

    // No migration path exists in either direction.
    tracing::warn!(component, current, target, "schema upgrade blocked");
    Err(AppError::MigrationBlocked {
        component: component.to_string(),
        current,
        target,
    })
}

/// Upgrade this crate's own component to [`SCHEMA_VERSION`].
pub async fn ensure_current(pool: &SqlitePool) -> Result<()> {
    upgrade(pool, COMPONENT, SCHEMA_VERSION).await
}
