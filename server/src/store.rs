//! SQLite-backed `TodoRepository`.
//!
//! # Design
//! The `todos` table is created on connect. `AUTOINCREMENT` keeps ids from
//! being reused after a delete. Writes use `RETURNING` so every mutation is a
//! single statement. Timestamps are stored as sqlx's text encoding of
//! `NaiveDateTime`. Parsed timestamps are limited to years 0001..=9999, so
//! that text sorts lexically in time order and the window filter compares
//! them directly in SQL.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use todo_core::{NewTodo, Todo, TodoError, TodoFilter, TodoRepository};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    completed BOOLEAN NOT NULL DEFAULT FALSE,
    deadline_at DATETIME,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
)";

const COLUMNS: &str = "id, title, description, completed, deadline_at, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    deadline_at: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            deadline_at: row.deadline_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    ///
    /// In-memory databases live only as long as their connection, so they get
    /// a single connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool_options = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        tracing::debug!("todos schema ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TodoRepository for SqliteStore {
    async fn insert(&self, todo: NewTodo, at: NaiveDateTime) -> Result<Todo, TodoError> {
        let sql = format!(
            "INSERT INTO todos (title, description, completed, deadline_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let row: TodoRow = sqlx::query_as(&sql)
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.completed)
            .bind(todo.deadline_at)
            .bind(at)
            .bind(at)
            .fetch_one(&self.pool)
            .await
            .map_err(TodoError::storage)?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let sql = format!("SELECT {COLUMNS} FROM todos WHERE id = ?");
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(TodoError::storage)?;
        Ok(row.map(Todo::from))
    }

    async fn find_all(&self, filter: &TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM todos WHERE 1 = 1"));
        if let Some(completed) = filter.completed {
            query.push(" AND completed = ").push_bind(completed);
        }
        if let Some(bound) = filter.deadline_before {
            // NULL < bound is NULL, so rows without a deadline drop out.
            query.push(" AND deadline_at < ").push_bind(bound);
        }
        query.push(" ORDER BY id");

        let rows: Vec<TodoRow> = query
            .build_query_as::<TodoRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(TodoError::storage)?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, TodoError> {
        let sql = format!(
            "UPDATE todos
             SET title = ?, description = ?, completed = ?, deadline_at = ?, updated_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        );
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.deadline_at)
            .bind(todo.updated_at)
            .bind(todo.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(TodoError::storage)?;
        Ok(row.map(Todo::from))
    }

    async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        let sql = format!("DELETE FROM todos WHERE id = ? RETURNING {COLUMNS}");
        let row: Option<TodoRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(TodoError::storage)?;
        Ok(row.map(Todo::from))
    }
}
