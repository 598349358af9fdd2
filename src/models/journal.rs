use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use uuid::fmt::Hyphenated;

/// A named collection owning a set of entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Journal {
    #[sqlx(try_from = "Hyphenated")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
