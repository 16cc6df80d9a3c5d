//! Todo repository module
//!
//! Defines the `TodoStore` operations the handlers call and the two
//! backends behind it:
//! - `PgTodoStore` for PostgreSQL
//! - `MemoryTodoStore` for dev mode and tests

mod memory;
mod postgres;

pub use memory::MemoryTodoStore;
pub use postgres::PgTodoStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::logger;
use crate::model::{NewTodo, Todo, TodoPatch};

/// Store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("todo not found")]
    NotFound,

    #[error("todo {0} already exists")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD operations over the `todos` table
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Insert a todo, generating its id when missing. The result carries `url`.
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Todo>;

    /// Every todo, each with `url`, in no particular order
    async fn list(&self) -> StoreResult<Vec<Todo>>;

    /// Merge `patch` onto the stored todo and write it back
    async fn update(&self, id: &str, patch: TodoPatch) -> StoreResult<Todo>;

    /// Succeeds whether or not the row existed
    async fn delete_by_id(&self, id: &str) -> StoreResult<()>;

    async fn delete_all(&self) -> StoreResult<()>;

    /// Release pooled resources on shutdown
    async fn close(&self) {}
}

pub const SAMPLE_TODO_TITLE: &str = "Set up and run the todo service";

/// Build the configured backend
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn TodoStore>, StoreError> {
    let store: Arc<dyn TodoStore> = match config.backend {
        DatabaseBackend::Postgres => Arc::new(PgTodoStore::connect(config).await?),
        DatabaseBackend::Memory => {
            logger::log_warning("Using in-memory todo store, data is lost on exit");
            Arc::new(MemoryTodoStore::new())
        }
    };

    if config.seed_sample {
        let todo = store.create(NewTodo::titled(SAMPLE_TODO_TITLE)).await?;
        logger::log_info(&format!("Seeded sample todo {}", todo.id));
    }

    Ok(store)
}
