use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sqlx::sqlite::SqliteSynchronous;

use crate::error::AppError;

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    /// Ephemeral store, gone when the pool closes.
    Memory,
}

/// Trade-off between write speed and crash durability, fastest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    Off,
    #[default]
    Normal,
    Full,
    Extra,
}

impl FromStr for Durability {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "unsafe" | "fastest" => Ok(Durability::Off),
            "normal" | "balanced" => Ok(Durability::Normal),
            "full" => Ok(Durability::Full),
            "extra" => Ok(Durability::Extra),
            other => Err(AppError::validation(format!(
                "unknown durability level `{other}` (expected off, normal, full or extra)"
            ))),
        }
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Durability::Off => write!(f, "off"),
            Durability::Normal => write!(f, "normal"),
            Durability::Full => write!(f, "full"),
            Durability::Extra => write!(f, "extra"),
        }
    }
}

impl From<Durability> for SqliteSynchronous {
    fn from(d: Durability) -> Self {
        match d {
            Durability::Off => SqliteSynchronous::Off,
            Durability::Normal => SqliteSynchronous::Normal,
            Durability::Full => SqliteSynchronous::Full,
            Durability::Extra => SqliteSynchronous::Extra,
        }
    }
}

/// Everything needed to open a connection pool. Passed explicitly to
/// [`crate::db::connect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub location: Location,
    pub wal: bool,
    pub durability: Durability,
}

impl Config {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            wal: true,
            durability: Durability::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            wal: true,
            durability: Durability::default(),
        }
    }

    /// `:memory:` selects an ephemeral store, anything else is a file path.
    pub fn from_location(location: &str) -> Self {
        if location == ":memory:" {
            Self::in_memory()
        } else {
            Self::file(location)
        }
    }

    pub fn with_wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }
}

/// Parse a loosely written on/off value.
pub fn parse_flag(value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::validation(format!("expected a boolean, got `{other}`"))),
    }
}
