use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use uuid::fmt::Hyphenated;

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Lifecycle of an entry. Purging a `Deleted` entry removes the row entirely,
/// so there is no third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Active,
    Deleted,
}

impl From<bool> for EntryState {
    fn from(deleted: bool) -> Self {
        if deleted {
            EntryState::Deleted
        } else {
            EntryState::Active
        }
    }
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryState::Active => write!(f, "active"),
            EntryState::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    #[sqlx(try_from = "Hyphenated")]
    pub id: Uuid,
    #[sqlx(try_from = "Hyphenated")]
    pub journal_id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: String,
    #[sqlx(rename = "deleted", try_from = "bool")]
    pub state: EntryState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_deleted(&self) -> bool {
        self.state == EntryState::Deleted
    }
}

/// Partial update for an entry. `None` or empty strings keep the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
}

impl EntryPatch {
    pub(crate) fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub(crate) fn content(&self) -> Option<&str> {
        non_empty(&self.content)
    }

    pub(crate) fn content_type(&self) -> Option<&str> {
        non_empty(&self.content_type)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Search hit: the entry plus how many query tags it carries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchedEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: Entry,
    pub match_count: i64,
    /// bm25 score, lower is better. Only set by text-augmented search.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}
