//! Tool-call surface: named operations with loosely-typed JSON arguments.
//!
//! Arguments are decoded here into the typed parameters the stores take;
//! anything malformed is rejected with a validation error before storage is
//! touched.

use serde::Serialize;
use serde_json::{Map, Value, json};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::parse_flag;
use crate::error::{AppError, Result};
use crate::models::EntryPatch;
use crate::search;
use crate::store::{entries, journals, tags};

pub const TOOL_NAMES: &[&str] = &[
    "journal_create",
    "journal_get",
    "journal_list",
    "journal_update",
    "journal_delete",
    "journal_delete_inactive",
    "entry_create",
    "entry_get",
    "entry_list",
    "entry_update",
    "entry_delete",
    "entry_purge",
    "tag_attach",
    "tag_detach",
    "tag_list_entry",
    "tag_list_journal",
    "tag_delete",
    "tag_list_all",
    "search",
];

/// Run the named tool and return its JSON result.
pub async fn call(pool: &SqlitePool, name: &str, args: &Value) -> Result<Value> {
    let args = Args::new(args)?;
    tracing::debug!(tool = name, "tool call");

    match name {
        "journal_create" => to_json(
            journals::create(pool, args.string("name")?, args.opt_string("description")?.unwrap_or(""))
                .await?,
        ),
        "journal_get" => to_json(journals::get(pool, args.uuid("journal_id")?).await?),
        "journal_list" => to_json(journals::list(pool, args.flag("active_only", false)?).await?),
        "journal_update" => {
            let id = args.uuid("journal_id")?;
            // Full replace on the store side, so fill gaps from the current row.
            let current = journals::get(pool, id).await?;
            let name = args.opt_string("name")?.unwrap_or(current.name.as_str());
            let description = args.opt_string("description")?.unwrap_or(current.description.as_str());
            let active = args.flag("active", current.active)?;
            to_json(journals::update(pool, id, name, description, active).await?)
        }
        "journal_delete" => {
            let id = args.uuid("journal_id")?;
            journals::delete(pool, id).await?;
            Ok(json!({ "deleted": id }))
        }
        "journal_delete_inactive" => {
            let removed = journals::delete_inactive(pool).await?;
            Ok(json!({ "deleted": removed }))
        }
        "entry_create" => {
            let entry = entries::create_with_tags(
                pool,
                args.uuid("journal_id")?,
                args.string("title")?,
                args.opt_string("content")?.unwrap_or(""),
                args.opt_string("content_type")?.unwrap_or(""),
                &args.tags("tags")?,
            )
            .await?;
            to_json(entry)
        }
        "entry_get" => to_json(entries::get(pool, args.uuid("entry_id")?).await?),
        "entry_list" => to_json(
            entries::list(pool, args.uuid("journal_id")?, args.flag("include_deleted", false)?).await?,
        ),
        "entry_update" => {
            let patch = EntryPatch {
                title: args.opt_string("title")?.map(str::to_string),
                content: args.opt_string("content")?.map(str::to_string),
                content_type: args.opt_string("content_type")?.map(str::to_string),
            };
            to_json(entries::update(pool, args.uuid("entry_id")?, &patch).await?)
        }
        "entry_delete" => {
            let id = args.uuid("entry_id")?;
            entries::delete(pool, id).await?;
            Ok(json!({ "deleted": id }))
        }
        "entry_purge" => {
            let purged = entries::purge_deleted(pool, args.uuid("journal_id")?).await?;
            Ok(json!({ "purged": purged }))
        }
        "tag_attach" => {
            let id = args.uuid("entry_id")?;
            let tag = args.string("tag")?;
            tags::attach(pool, id, tag).await?;
            Ok(json!({ "entry_id": id, "tag": tag.trim() }))
        }
        "tag_detach" => {
            let id = args.uuid("entry_id")?;
            let tag = args.string("tag")?;
            tags::detach(pool, id, tag).await?;
            Ok(json!({ "entry_id": id, "detached": tag.trim() }))
        }
        "tag_list_entry" => to_json(tags::list_for_entry(pool, args.uuid("entry_id")?).await?),
        "tag_list_journal" => to_json(tags::list_for_journal(pool, args.uuid("journal_id")?).await?),
        "tag_delete" => {
            let tag = args.string("tag")?;
            tags::delete(pool, tag).await?;
            Ok(json!({ "deleted": tag.trim() }))
        }
        "tag_list_all" => to_json(tags::list_all(pool).await?),
        "search" => {
            let text = args.opt_string("query")?.filter(|q| !q.trim().is_empty());
            let results = search::search(pool, args.uuid("journal_id")?, &args.tags("tags")?, text).await?;
            to_json(results)
        }
        other => Err(AppError::validation(format!("unknown tool `{other}`"))),
    }
}

/// User-facing message for a failed call.
pub fn render_error(err: &AppError) -> String {
    match err {
        AppError::JournalNotFound(id) => format!("not found: journal {id}"),
        AppError::EntryNotFound(id) => format!("not found: entry {id}"),
        AppError::TagNotFound(tag) => format!("not found: tag `{tag}`"),
        AppError::Validation(msg) => format!("invalid arguments: {msg}"),
        AppError::MigrationBlocked { .. } => format!("{err}; an explicit upgrade path is required"),
        AppError::Storage(_) | AppError::Serialization(_) | AppError::Io(_) => {
            tracing::error!("tool call failed: {err}");
            "internal storage error".to_string()
        }
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

struct Args<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    fn new(value: &'a Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            _ => Err(AppError::validation("arguments must be a JSON object")),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.and_then(|m| m.get(key)).filter(|v| !v.is_null())
    }

    fn opt_string(&self, key: &str) -> Result<Option<&'a str>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(AppError::validation(format!("`{key}` must be a string"))),
        }
    }

    fn string(&self, key: &str) -> Result<&'a str> {
        match self.opt_string(key)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(AppError::validation(format!("`{key}` is required"))),
        }
    }

    fn uuid(&self, key: &str) -> Result<Uuid> {
        let raw = self.string(key)?;
        Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::validation(format!("`{key}` is not a valid id: {raw}")))
    }

    fn flag(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => parse_flag(s),
            Some(_) => Err(AppError::validation(format!("`{key}` must be a boolean"))),
        }
    }

    /// Array of strings or a single comma-separated string.
    fn tags(&self, key: &str) -> Result<Vec<String>> {
        let tags: Vec<String> = match self.get(key) {
            None => vec![],
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| AppError::validation(format!("`{key}` must contain strings")))
                })
                .collect::<Result<_>>()?,
            Some(_) => return Err(AppError::validation(format!("`{key}` must be a list of tags"))),
        };

        Ok(tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_must_be_object() {
        assert!(Args::new(&json!([1, 2])).is_err());
        assert!(Args::new(&Value::Null).is_ok());
    }

    #[test]
    fn tags_accept_list_or_csv() {
        let value = json!({ "a": "x, y,,z", "b": ["x", " y "], "c": [1] });
        let args = Args::new(&value).unwrap();
        assert_eq!(args.tags("a").unwrap(), vec!["x", "y", "z"]);
        assert_eq!(args.tags("b").unwrap(), vec!["x", "y"]);
        assert!(args.tags("c").is_err());
        assert!(args.tags("missing").unwrap().is_empty());
    }

    #[test]
    fn flags_accept_strings() {
        let value = json!({ "a": "true", "b": false, "c": 3 });
        let args = Args::new(&value).unwrap();
        assert!(args.flag("a", false).unwrap());
        assert!(!args.flag("b", true).unwrap());
        assert!(args.flag("c", false).is_err());
        assert!(args.flag("missing", true).unwrap());
    }

    #[test]
    fn malformed_uuid_is_validation_error() {
        let value = json!({ "id": "not-a-uuid", "blank": "  " });
        let args = Args::new(&value).unwrap();
        assert!(matches!(args.uuid("id"), Err(AppError::Validation(_))));
        assert!(matches!(args.uuid("blank"), Err(AppError::Validation(_))));
        assert!(matches!(args.uuid("missing"), Err(AppError::Validation(_))));
    }

    #[test]
    fn not_found_renders_as_message() {
        let msg = render_error(&AppError::TagNotFound("x".into()));
        assert_eq!(msg, "not found: tag `x`");
    }
}
