use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("journal not found: {0}")]
    JournalNotFound(Uuid),

    #[error("entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("tag not found: {0}")]
    TagNotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    /// The stored schema is neither fresh nor at the requested version.
    #[error("schema for `{component}` is at version {current}, cannot move to {target}")]
    MigrationBlocked {
        component: String,
        current: i64,
        target: i64,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::JournalNotFound(_) | AppError::EntryNotFound(_) | AppError::TagNotFound(_)
        )
    }
}
