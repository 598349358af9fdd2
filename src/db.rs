use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};

use crate::config::{Config, Location};
use crate::error::Result;

/// Open a pool for `config`. Tables are not created here; call
/// [`crate::schema::upgrade`] before using any store.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let pool = match &config.location {
        Location::File(path) => {
            // Ensure data directory exists
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let journal_mode = if config.wal {
                SqliteJournalMode::Wal
            } else {
                SqliteJournalMode::Delete
            };

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true)
                .journal_mode(journal_mode)
                .synchronous(config.durability.into());

            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        }
        Location::Memory => {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")?
                .foreign_keys(true)
                .synchronous(config.durability.into());

            // Every in-memory connection is its own database, so keep exactly one alive.
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        }
    };

    tracing::info!(
        location = ?config.location,
        wal = config.wal,
        durability = %config.durability,
        "opened store"
    );

    Ok(pool)
}

/// Store-assigned timestamp. Fixed width, so text order is time order.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
