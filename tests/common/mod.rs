use sqlx::SqlitePool;
use uuid::Uuid;

use mnemo::models::{Entry, Journal};
use mnemo::store::{entries, journals, tags};
use mnemo::{Config, db, schema};

pub struct TestStore {
    pub db: SqlitePool,
}

impl TestStore {
    /// Fresh in-memory store with the schema in place.
    pub async fn new() -> Self {
        let db = Self::bare().await.db;
        schema::ensure_current(&db)
            .await
            .expect("Failed to initialize schema");
        Self { db }
    }

    /// In-memory store with no tables.
    pub async fn bare() -> Self {
        let db = db::connect(&Config::in_memory())
            .await
            .expect("Failed to create in-memory SQLite pool");
        Self { db }
    }

    pub async fn journal(&self, name: &str) -> Journal {
        journals::create(&self.db, name, "")
            .await
            .expect("Failed to create test journal")
    }

    /// Create an entry in `journal_id` carrying `labels`.
    pub async fn entry(&self, journal_id: Uuid, title: &str, labels: &[&str]) -> Entry {
        let entry = entries::create(&self.db, journal_id, title, "", "")
            .await
            .expect("Failed to create test entry");
        for label in labels {
            tags::attach(&self.db, entry.id, label)
                .await
                .expect("Failed to attach test tag");
        }
        entry
    }

    pub async fn count(&self, sql: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(sql).fetch_one(&self.db).await.unwrap();
        n
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
