use std::{str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use uuid::Uuid;

use crate::config::database_path;
use crate::domain::{
    filter::Filter,
    repository::{TodoRepository, TodoStore},
    todo::{NewTodo, Tag, TagId, Todo, TodoId},
};

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS tags (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        completed_at TEXT,
        tag_id TEXT REFERENCES tags(id) ON UPDATE CASCADE ON DELETE SET NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_todos_tag_id ON todos(tag_id)",
    "CREATE INDEX IF NOT EXISTS idx_todos_updated_at ON todos(updated_at)",
];

const SELECT_TODO: &str = "SELECT t.id, t.title, t.completed_at, t.tag_id, g.name AS tag_name, t.created_at, t.updated_at
     FROM todos t LEFT JOIN tags g ON g.id = t.tag_id";

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        if !in_memory {
            ensure_parent_dir(database_url)?;
        }
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url `{database_url}`"))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `sqlite::memory:` is a separate database, so pin one.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database `{database_url}`"))?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoStore for SqliteTodoRepository {
    async fn count_by_filter(&self, filter: Filter) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) AS n FROM todos t{}", where_clause(filter));
        let row = sqlx::query(&sql).fetch_one(&*self.pool).await?;
        let n: i64 = row.try_get("n")?;
        Ok(usize::try_from(n)?)
    }

    async fn read_page(&self, filter: Filter, limit: usize, offset: usize) -> Result<Vec<Todo>> {
        let sql = format!(
            "{SELECT_TODO}{} ORDER BY t.updated_at DESC, t.rowid DESC LIMIT ?1 OFFSET ?2",
            where_clause(filter)
        );
        let rows = sqlx::query(&sql)
            .bind(i64::try_from(limit)?)
            .bind(i64::try_from(offset)?)
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn save_todo(&self, todo: &Todo) -> Result<Todo> {
        let mut saved = todo.clone();
        saved.updated_at = Utc::now();
        sqlx::query(
            "INSERT INTO todos (id, title, completed_at, tag_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                completed_at = excluded.completed_at,
                tag_id = excluded.tag_id,
                updated_at = excluded.updated_at",
        )
        .bind(saved.id.0.to_string())
        .bind(&saved.title)
        .bind(saved.completed_at.map(timestamp))
        .bind(saved.tag_id.as_ref().map(|t| t.0.to_string()))
        .bind(timestamp(saved.created_at))
        .bind(timestamp(saved.updated_at))
        .execute(&*self.pool)
        .await?;
        Ok(saved)
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&*self.pool).await?;
        }
        Ok(())
    }

    async fn create(&self, input: NewTodo) -> Result<Todo> {
        let now = Utc::now();
        let todo = Todo {
            id: TodoId(Uuid::new_v4()),
            title: input.title,
            completed_at: None,
            tag_id: input.tag.as_ref().map(|t| t.id.clone()),
            tag_name: input.tag.map(|t| t.name),
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO todos (id, title, completed_at, tag_id, created_at, updated_at)
             VALUES (?1, ?2, NULL, ?3, ?4, ?5)",
        )
        .bind(todo.id.0.to_string())
        .bind(&todo.title)
        .bind(todo.tag_id.as_ref().map(|t| t.0.to_string()))
        .bind(timestamp(now))
        .bind(timestamp(now))
        .execute(&*self.pool)
        .await?;
        Ok(todo)
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("{SELECT_TODO} WHERE t.id = ?1"))
            .bind(id.0.to_string())
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_todo).transpose()
    }

    async fn find_tag(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, created_at FROM tags WHERE name = ?1")
            .bind(name)
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_tag).transpose()
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let tag = Tag { id: TagId(Uuid::new_v4()), name: name.to_string(), created_at: Utc::now() };
        sqlx::query("INSERT INTO tags (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(tag.id.0.to_string())
            .bind(&tag.name)
            .bind(timestamp(tag.created_at))
            .execute(&*self.pool)
            .await?;
        Ok(tag)
    }
}

fn where_clause(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "",
        Filter::Unfinished => " WHERE t.completed_at IS NULL",
        Filter::Finished => " WHERE t.completed_at IS NOT NULL",
    }
}

/// Fixed precision keeps lexical order equal to chronological order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("malformed timestamp `{raw}`"))?
        .with_timezone(&Utc))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("malformed id `{raw}`"))
}

fn row_to_todo(row: SqliteRow) -> Result<Todo> {
    let id: String = row.try_get("id")?;
    let completed_at: Option<String> = row.try_get("completed_at")?;
    let tag_id: Option<String> = row.try_get("tag_id")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Todo {
        id: TodoId(parse_uuid(&id)?),
        title: row.try_get("title")?,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
        tag_id: tag_id.as_deref().map(parse_uuid).transpose()?.map(TagId),
        tag_name: row.try_get("tag_name")?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_tag(row: SqliteRow) -> Result<Tag> {
    let id: String = row.try_get("id")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Tag {
        id: TagId(parse_uuid(&id)?),
        name: row.try_get("name")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_path(database_url) else { return Ok(()) };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}
