//! Persistence seam for todo records.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::TodoError;
use crate::types::{NewTodo, Todo, TodoFilter};

/// Storage for todo records.
///
/// Implementations assign ids, never reuse them, and return lists in
/// ascending id order. Backend failures surface as `TodoError::Storage`.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Store a new record with `created_at` and `updated_at` set to `at`.
    async fn insert(&self, todo: NewTodo, at: NaiveDateTime) -> Result<Todo, TodoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, TodoError>;

    /// Every record matching `filter`, ordered by id.
    async fn find_all(&self, filter: &TodoFilter) -> Result<Vec<Todo>, TodoError>;

    /// Overwrite the mutable fields of an existing record, including
    /// `updated_at`. Returns `None` if the record no longer exists.
    async fn update(&self, todo: &Todo) -> Result<Option<Todo>, TodoError>;

    /// Remove a record, returning what was removed.
    async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError>;
}
