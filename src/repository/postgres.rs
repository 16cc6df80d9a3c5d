//! PostgreSQL todo store
//!
//! Statements are plain runtime queries against the `todos` table
//! (`id, title, completed, order_number`). `completed` and `order_number`
//! are nullable columns and read back as `false` / `0` when NULL.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Connection, FromRow};
use std::time::Duration;

use super::{StoreError, StoreResult, TodoStore};
use crate::config::DatabaseConfig;
use crate::logger;
use crate::model::{NewTodo, Todo, TodoPatch};

const SELECT_COLUMNS: &str = "SELECT id, title, completed, order_number FROM todos";

#[derive(Debug, FromRow)]
struct TodoRow {
    id: String,
    title: String,
    completed: Option<bool>,
    order_number: Option<i32>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            completed: row.completed.unwrap_or(false),
            order: row.order_number.unwrap_or(0),
            url: None,
        }
    }
}

pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    /// Open the pool and ping one connection so a bad URL fails at startup
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            sqlx::Error::Configuration("no database url (set POSTGRESQL_URL)".into())
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .max_lifetime(Some(Duration::from_secs(config.max_lifetime)))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout)))
            .test_before_acquire(true)
            .connect(url)
            .await?;

        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        drop(conn);

        logger::log_info(&format!(
            "Connected to PostgreSQL (pool max {} connections)",
            config.max_connections
        ));

        Ok(Self::from_pool(pool))
    }

    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map unique-key violations to `Duplicate`, everything else passes through
fn insert_error(err: sqlx::Error, id: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(id.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        let mut todo = todo.into_todo();

        let id = sqlx::query_scalar::<_, String>(
            "INSERT INTO todos (id, title, completed, order_number) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&todo.id)
        .bind(&todo.title)
        .bind(todo.completed)
        .bind(todo.order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, &todo.id))?;

        todo.id = id;
        Ok(todo.with_url())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Todo> {
        let row = sqlx::query_as::<_, TodoRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Todo::from).ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        let rows = sqlx::query_as::<_, TodoRow>(SELECT_COLUMNS)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Todo::from(row).with_url())
            .collect())
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> StoreResult<Todo> {
        let mut tx = self.pool.begin().await?;

        // Row lock holds off concurrent updates until commit
        let row = sqlx::query_as::<_, TodoRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut todo = row.map(Todo::from).ok_or(StoreError::NotFound)?;
        todo.apply(&patch);

        sqlx::query("UPDATE todos SET title = $2, completed = $3, order_number = $4 WHERE id = $1")
            .bind(&todo.id)
            .bind(&todo.title)
            .bind(todo.completed)
            .bind(todo.order)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(todo)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_columns_default() {
        let todo = Todo::from(TodoRow {
            id: "a-1".to_string(),
            title: "t".to_string(),
            completed: None,
            order_number: None,
        });
        assert!(!todo.completed);
        assert_eq!(todo.order, 0);
        assert!(todo.url.is_none());
    }

    /// Runs against a live database only when `POSTGRESQL_URL` is set.
    /// The `todos` table from `sql/schema.sql` must exist.
    async fn live_store() -> Option<PgTodoStore> {
        let url = std::env::var("POSTGRESQL_URL").ok()?;
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .ok()?;
        Some(PgTodoStore::from_pool(pool))
    }

    #[tokio::test]
    async fn test_live_crud_cycle() {
        let Some(store) = live_store().await else {
            return;
        };

        let created = store.create(NewTodo::titled("pg test")).await.unwrap();
        assert_eq!(created.url, Some(format!("/todos/{}", created.id)));

        let patch = TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        };
        let updated = store.update(&created.id, patch).await.unwrap();
        assert_eq!(updated.title, "pg test");
        assert!(updated.completed);

        let found = store.find_by_id(&created.id).await.unwrap();
        assert!(found.completed);

        store.delete_by_id(&created.id).await.unwrap();
        store.delete_by_id(&created.id).await.unwrap();
        assert!(matches!(
            store.find_by_id(&created.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_live_duplicate_id() {
        let Some(store) = live_store().await else {
            return;
        };

        let id = uuid::Uuid::new_v4().to_string();
        let input = NewTodo {
            id: Some(id.clone()),
            ..NewTodo::titled("dup")
        };
        store.create(input.clone()).await.unwrap();
        assert!(matches!(
            store.create(input).await,
            Err(StoreError::Duplicate(_))
        ));
        store.delete_by_id(&id).await.unwrap();
    }
}
