//! Command-line surface. Parses arguments into typed store calls and prints
//! the results as text or JSON.

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::{Config, Durability};
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{Entry, EntryPatch, Journal, MatchedEntry, Tag};
use crate::schema;
use crate::search;
use crate::store::{entries, journals, tags};
use crate::tools;

#[derive(Debug, Parser)]
#[command(name = "mnemo", version, about = "Journal-organized memory store")]
pub struct Cli {
    /// Database file, or `:memory:` for an ephemeral store
    #[arg(long, env = "MNEMO_DATABASE", default_value = "data/mnemo.db", global = true)]
    pub database: String,

    /// Use write-ahead logging
    #[arg(long, env = "MNEMO_WAL", default_value_t = true, action = ArgAction::Set, global = true)]
    pub wal: bool,

    /// Durability level: off, normal, full or extra
    #[arg(long, env = "MNEMO_SYNC", default_value = "normal", global = true)]
    pub sync: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the schema on a fresh store or check it is current
    Upgrade,
    /// Show the recorded schema version
    Version,
    #[command(subcommand)]
    Journal(JournalCommand),
    #[command(subcommand)]
    Entry(EntryCommand),
    #[command(subcommand)]
    Tag(TagCommand),
    /// Rank a journal's entries by tag overlap, optionally by text relevance
    Search {
        journal: Uuid,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Free-text query
        #[arg(long)]
        text: Option<String>,
    },
    /// Invoke a named tool with JSON arguments
    Tool {
        name: String,
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum JournalCommand {
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    List {
        #[arg(long)]
        active_only: bool,
    },
    Show {
        id: Uuid,
    },
    /// Change a journal; fields left out keep their current value
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, action = ArgAction::Set)]
        active: Option<bool>,
    },
    Delete {
        id: Uuid,
    },
    /// Delete every inactive journal
    Prune,
}

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    Add {
        journal: Uuid,
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, default_value = "")]
        content_type: String,
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    List {
        journal: Uuid,
        #[arg(long)]
        include_deleted: bool,
    },
    Show {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        patch: PatchArgs,
    },
    /// Mark an entry deleted
    Delete {
        id: Uuid,
    },
    /// Remove a journal's deleted entries for good
    Purge {
        journal: Uuid,
    },
}

#[derive(Debug, Args)]
pub struct PatchArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    content_type: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TagCommand {
    Attach {
        entry: Uuid,
        tag: String,
    },
    Detach {
        entry: Uuid,
        tag: String,
    },
    /// List tags of an entry, a journal, or (with neither) all tags
    List {
        #[arg(long, conflicts_with = "journal")]
        entry: Option<Uuid>,
        #[arg(long)]
        journal: Option<Uuid>,
    },
    Delete {
        tag: String,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let durability: Durability = cli.sync.parse()?;
    let config = Config::from_location(&cli.database)
        .with_wal(cli.wal)
        .with_durability(durability);
    let pool = db::connect(&config).await?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Upgrade => {
            schema::ensure_current(&pool).await?;
            out.message(&format!("schema at version {}", schema::SCHEMA_VERSION));
        }
        Command::Version => {
            let version = schema::current_version(&pool, schema::COMPONENT).await?;
            out.value(&version, |v| v.to_string())?;
        }
        Command::Journal(cmd) => journal(&pool, &out, cmd).await?,
        Command::Entry(cmd) => entry(&pool, &out, cmd).await?,
        Command::Tag(cmd) => tag(&pool, &out, cmd).await?,
        Command::Search { journal, tags, text } => {
            let results = search::search(&pool, journal, &tags, text.as_deref()).await?;
            out.value(&results, |r| render_matches(r))?;
        }
        Command::Tool { name, args } => {
            let args: serde_json::Value = serde_json::from_str(&args)
                .map_err(|e| AppError::validation(format!("tool arguments are not JSON: {e}")))?;
            let value = tools::call(&pool, &name, &args).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    pool.close().await;
    Ok(())
}

async fn journal(pool: &SqlitePool, out: &Output, cmd: JournalCommand) -> Result<()> {
    match cmd {
        JournalCommand::Create { name, description } => {
            let journal = journals::create(pool, &name, &description).await?;
            out.value(&journal, render_journal)
        }
        JournalCommand::List { active_only } => {
            let list = journals::list(pool, active_only).await?;
            out.value(&list, |l| lines(l, render_journal))
        }
        JournalCommand::Show { id } => out.value(&journals::get(pool, id).await?, render_journal),
        JournalCommand::Update {
            id,
            name,
            description,
            active,
        } => {
            // Full replace on the store side, so fill gaps from the current row.
            let current = journals::get(pool, id).await?;
            let journal = journals::update(
                pool,
                id,
                name.as_deref().unwrap_or(&current.name),
                description.as_deref().unwrap_or(&current.description),
                active.unwrap_or(current.active),
            )
            .await?;
            out.value(&journal, render_journal)
        }
        JournalCommand::Delete { id } => {
            journals::delete(pool, id).await?;
            out.message(&format!("deleted journal {id}"));
            Ok(())
        }
        JournalCommand::Prune => {
            let removed = journals::delete_inactive(pool).await?;
            out.message(&format!("deleted {removed} inactive journal(s)"));
            Ok(())
        }
    }
}

async fn entry(pool: &SqlitePool, out: &Output, cmd: EntryCommand) -> Result<()> {
    match cmd {
        EntryCommand::Add {
            journal,
            title,
            content,
            content_type,
            tags: labels,
        } => {
            let labels: Vec<String> = labels.into_iter().filter(|l| !l.trim().is_empty()).collect();
            let entry =
                entries::create_with_tags(pool, journal, &title, &content, &content_type, &labels).await?;
            out.value(&entry, render_entry)
        }
        EntryCommand::List {
            journal,
            include_deleted,
        } => {
            let list = entries::list(pool, journal, include_deleted).await?;
            out.value(&list, |l| lines(l, render_entry))
        }
        EntryCommand::Show { id } => out.value(&entries::get(pool, id).await?, render_entry),
        EntryCommand::Update { id, patch } => {
            let patch = EntryPatch {
                title: patch.title,
                content: patch.content,
                content_type: patch.content_type,
            };
            out.value(&entries::update(pool, id, &patch).await?, render_entry)
        }
        EntryCommand::Delete { id } => {
            entries::delete(pool, id).await?;
            out.message(&format!("deleted entry {id}"));
            Ok(())
        }
        EntryCommand::Purge { journal } => {
            let purged = entries::purge_deleted(pool, journal).await?;
            out.message(&format!("purged {purged} deleted entries"));
            Ok(())
        }
    }
}

async fn tag(pool: &SqlitePool, out: &Output, cmd: TagCommand) -> Result<()> {
    match cmd {
        TagCommand::Attach { entry, tag } => {
            tags::attach(pool, entry, &tag).await?;
            out.message(&format!("tagged {entry} with `{}`", tag.trim()));
            Ok(())
        }
        TagCommand::Detach { entry, tag } => {
            tags::detach(pool, entry, &tag).await?;
            out.message(&format!("removed `{}` from {entry}", tag.trim()));
            Ok(())
        }
        TagCommand::List {
            entry: Some(entry), ..
        } => {
            let list = tags::list_for_entry(pool, entry).await?;
            out.value(&list, |l| lines(l, render_tag))
        }
        TagCommand::List {
            journal: Some(journal),
            ..
        } => {
            let list = tags::list_for_journal(pool, journal).await?;
            out.value(&list, |l| lines(l, render_tag))
        }
        TagCommand::List { .. } => {
            let list = tags::list_all(pool).await?;
            out.value(&list, |l| {
                lines(l, |t| format!("{} ({})", t.tag, t.entry_count))
            })
        }
        TagCommand::Delete { tag } => {
            tags::delete(pool, &tag).await?;
            out.message(&format!("deleted tag `{}`", tag.trim()));
            Ok(())
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn value<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }

    fn message(&self, msg: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "message": msg }));
        } else {
            println!("{msg}");
        }
    }
}

fn lines<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items.iter().map(render).collect::<Vec<_>>().join("\n")
}

fn render_journal(j: &Journal) -> String {
    let status = if j.active { "" } else { " [inactive]" };
    format!("{}  {}{}  {}", j.id, j.name, status, j.description)
}

fn render_entry(e: &Entry) -> String {
    let status = if e.is_deleted() { " [deleted]" } else { "" };
    format!(
        "{}  {}{}  ({}, updated {})",
        e.id,
        e.title,
        status,
        e.content_type,
        e.updated_at.format("%Y-%m-%d %H:%M")
    )
}

fn render_tag(t: &Tag) -> String {
    t.tag.clone()
}

fn render_matches(results: &[MatchedEntry]) -> String {
    lines(results, |m| format!("[{}] {}", m.match_count, render_entry(&m.entry)))
}
