use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub tag: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    /// Trim a label, rejecting ones that are empty afterwards.
    pub fn normalize(name: &str) -> Option<&str> {
        let name = name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// A tag together with how many entries carry it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagUsage {
    pub tag: String,
    pub entry_count: i64,
}
