//! Tag-ranked search over a journal's live entries.
//!
//! Pure tag mode ranks by how many of the query tags an entry carries
//! (extra tags on the entry don't count against it), newest first on ties.
//! Text mode restricts candidates to full-text hits and ranks by bm25 first,
//! then by tag overlap, then by recency.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{MatchedEntry, Tag};

/// Dispatch on whether a text query was given.
pub async fn search(
    pool: &SqlitePool,
    journal_id: Uuid,
    tags: &[String],
    text: Option<&str>,
) -> Result<Vec<MatchedEntry>> {
    match text {
        Some(text) => search_text(pool, journal_id, tags, text).await,
        None => search_tags(pool, journal_id, tags).await,
    }
}

/// Entries carrying at least one of `tags`. No tags means no results.
pub async fn search_tags(
    pool: &SqlitePool,
    journal_id: Uuid,
    tags: &[String],
) -> Result<Vec<MatchedEntry>> {
    let tags = query_tags(tags);
    if tags.is_empty() {
        return Ok(vec![]);
    }

    let sql = format!(
        r#"
        SELECT e.*, COUNT(DISTINCT et.tag) AS match_count
        FROM entries e
        JOIN entry_tags et ON et.entry_id = e.id
        WHERE e.journal_id = ? AND e.deleted = 0 AND et.tag IN ({})
        GROUP BY e.id
        ORDER BY match_count DESC, e.updated_at DESC, e.seq DESC
        "#,
        placeholders(tags.len())
    );

    let mut query = sqlx::query_as::<_, MatchedEntry>(&sql).bind(journal_id.to_string());
    for tag in &tags {
        query = query.bind(*tag);
    }

    let results = query.fetch_all(pool).await?;
    tracing::debug!(journal_id = %journal_id, tags = tags.len(), hits = results.len(), "tag search");
    Ok(results)
}

/// Full-text hits refined by tag overlap. Tags may be empty here; every hit
/// is kept with a match count of zero.
pub async fn search_text(
    pool: &SqlitePool,
    journal_id: Uuid,
    tags: &[String],
    text: &str,
) -> Result<Vec<MatchedEntry>> {
    let Some(fts_query) = fts_query(text) else {
        return Err(AppError::validation(
            "text query must not be empty; use tag search instead",
        ));
    };
    let tags = query_tags(tags);

    let match_count = if tags.is_empty() {
        "0".to_string()
    } else {
        format!(
            "(SELECT COUNT(DISTINCT et.tag) FROM entry_tags et WHERE et.entry_id = e.id AND et.tag IN ({}))",
            placeholders(tags.len())
        )
    };

    let sql = format!(
        r#"
        SELECT e.*, {match_count} AS match_count, hits.relevance AS relevance
        FROM (
            SELECT rowid, bm25(entries_fts) AS relevance
            FROM entries_fts
            WHERE entries_fts MATCH ?
        ) hits
        JOIN entries e ON e.seq = hits.rowid
        WHERE e.journal_id = ? AND e.deleted = 0
        ORDER BY hits.relevance ASC, match_count DESC, e.updated_at DESC, e.seq DESC
        "#
    );

    // Placeholders bind in textual order: tag list, match expression, journal.
    let mut query = sqlx::query_as::<_, MatchedEntry>(&sql);
    for tag in &tags {
        query = query.bind(*tag);
    }
    let results = query
        .bind(fts_query)
        .bind(journal_id.to_string())
        .fetch_all(pool)
        .await?;

    tracing::debug!(journal_id = %journal_id, text, hits = results.len(), "text search");
    Ok(results)
}

/// Trimmed, non-empty, de-duplicated query tags, first occurrence wins.
fn query_tags(tags: &[String]) -> Vec<&str> {
    let mut seen = Vec::new();
    for tag in tags.iter().filter_map(|t| Tag::normalize(t)) {
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Quote each whitespace-separated term as an FTS5 phrase so arbitrary user
/// text can't produce a syntax error. Terms are ANDed; terms with no word
/// characters would be empty phrases and are dropped.
fn fts_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect();

    (!terms.is_empty()).then(|| terms.join(" "))
}
