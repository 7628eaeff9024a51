//! In-process `TodoRepository` backed by an ordered map.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use crate::error::TodoError;
use crate::repository::TodoRepository;
use crate::types::{NewTodo, Todo, TodoFilter};

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    todos: BTreeMap<i64, Todo>,
    last_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for MemoryStore {
    async fn insert(&self, todo: NewTodo, at: NaiveDateTime) -> Result<Todo, TodoError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let todo = Todo {
            id: inner.last_id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            deadline_at: todo.deadline_at,
            created_at: at,
            updated_at: at,
        };
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        Ok(self.inner.read().await.todos.get(&id).cloned())
    }

    async fn find_all(&self, filter: &TodoFilter) -> Result<Vec<Todo>, TodoError> {
        let inner = self.inner.read().await;
        Ok(inner
            .todos
            .values()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect())
    }

    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, TodoError> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.todos.get_mut(&todo.id) else {
            return Ok(None);
        };
        stored.title = todo.title.clone();
        stored.description = todo.description.clone();
        stored.completed = todo.completed;
        stored.deadline_at = todo.deadline_at;
        stored.updated_at = todo.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        Ok(self.inner.write().await.todos.remove(&id))
    }
}
