//! In-memory todo store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, TodoStore};
use crate::model::{NewTodo, Todo, TodoPatch};

#[derive(Default)]
pub struct MemoryTodoStore {
    todos: RwLock<HashMap<String, Todo>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        let todo = todo.into_todo();
        let mut todos = self.todos.write().await;
        if todos.contains_key(&todo.id) {
            return Err(StoreError::Duplicate(todo.id));
        }
        todos.insert(todo.id.clone(), todo.clone());
        Ok(todo.with_url())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Todo> {
        self.todos
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<Todo>> {
        Ok(self
            .todos
            .read()
            .await
            .values()
            .cloned()
            .map(Todo::with_url)
            .collect())
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> StoreResult<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos.get_mut(id).ok_or(StoreError::NotFound)?;
        todo.apply(&patch);
        Ok(todo.clone())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        self.todos.write().await.remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.todos.write().await.clear();
        Ok(())
    }
}
