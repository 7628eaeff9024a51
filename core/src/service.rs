//! The todo service: payload validation in front of a `TodoRepository`.
//!
//! # Design
//! `TodoService` owns no state besides the injected repository and a clock,
//! so it is cheap to clone into every request handler. All operations take
//! raw JSON bodies and query strings and return either a record or a
//! `TodoError` that already carries its client-facing message.

use std::sync::Arc;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::Value;

use crate::error::TodoError;
use crate::payload;
use crate::repository::TodoRepository;
use crate::types::{ListQuery, Todo};

/// Source of "now" for timestamps and window filters.
pub type Clock = fn() -> NaiveDateTime;

/// Current UTC time truncated to microseconds.
pub fn system_clock() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

#[derive(Clone)]
pub struct TodoService {
    repo: Arc<dyn TodoRepository>,
    clock: Clock,
}

impl TodoService {
    pub fn new(repo: Arc<dyn TodoRepository>) -> Self {
        Self {
            repo,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Todo>, TodoError> {
        let filter = payload::parse_list_query(query, (self.clock)())?;
        self.repo.find_all(&filter).await
    }

    pub async fn get(&self, id: i64) -> Result<Todo, TodoError> {
        self.repo.find_by_id(id).await?.ok_or(TodoError::NotFound)
    }

    pub async fn create(&self, body: &Value) -> Result<Todo, TodoError> {
        let new = payload::parse_new_todo(body)?;
        self.repo.insert(new, (self.clock)()).await
    }

    /// Overwrite the fields present in `body`. `updated_at` is always
    /// refreshed, even for an empty body.
    pub async fn update(&self, id: i64, body: &Value) -> Result<Todo, TodoError> {
        let fields = payload::check_update_keys(body)?;
        let mut todo = self.get(id).await?;
        payload::parse_changes(fields)?.apply_to(&mut todo);
        todo.updated_at = (self.clock)();
        self.repo.update(&todo).await?.ok_or(TodoError::NotFound)
    }

    /// Delete a record. A missing record is not an error.
    pub async fn delete(&self, id: i64) -> Result<Option<Todo>, TodoError> {
        self.repo.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;

    fn feb_20() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn feb_21() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 21)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn service() -> TodoService {
        TodoService::new(Arc::new(MemoryStore::new())).with_clock(feb_20)
    }

    fn list_query(completed: Option<&str>, window: Option<&str>) -> ListQuery {
        ListQuery {
            completed: completed.map(str::to_string),
            window: window.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let service = service();
        let created = service
            .create(&json!({"title": "Buy milk", "description": "2L"}))
            .await
            .unwrap();
        assert_eq!(created.created_at, feb_20());
        assert_eq!(created.updated_at, feb_20());

        let fetched = service.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = service().get(42).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let service = service();
        let created = service.create(&json!({"title": "Buy milk"})).await.unwrap();

        let later = service.clone().with_clock(feb_21);
        let updated = later
            .update(created.id, &json!({"completed": true, "created_at": "1999-01-01"}))
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "Buy milk");
        assert_eq!(updated.created_at, feb_20());
        assert_eq!(updated.updated_at, feb_21());
    }

    #[tokio::test]
    async fn update_checks_keys_before_lookup() {
        let err = service().update(7, &json!({"id": 7})).await.unwrap_err();
        assert!(matches!(err, TodoError::ImmutableId));

        let err = service().update(7, &json!({"title": "x"})).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn update_validates_deadline() {
        let service = service();
        let created = service.create(&json!({"title": "x"})).await.unwrap();
        let err = service
            .update(created.id, &json!({"deadline_at": "soon"}))
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::InvalidTimestamp { .. }));
        assert_eq!(service.get(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn delete_returns_record_then_nothing() {
        let service = service();
        let created = service.create(&json!({"title": "x"})).await.unwrap();
        assert_eq!(service.delete(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(service.delete(created.id).await.unwrap(), None);
        assert!(matches!(
            service.get(created.id).await,
            Err(TodoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_applies_window_relative_to_clock() {
        let service = service();
        for (title, deadline) in [
            ("tomorrow", json!("2023-02-21T00:00:00")),
            ("next week", json!("2023-02-27T00:00:00")),
            ("someday", json!(null)),
        ] {
            service
                .create(&json!({"title": title, "deadline_at": deadline}))
                .await
                .unwrap();
        }

        let hits = service.list(&list_query(None, Some("7"))).await.unwrap();
        let titles: Vec<_> = hits.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["tomorrow"]);

        let all = service.list(&ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn list_filters_on_completed() {
        let service = service();
        service.create(&json!({"title": "done", "completed": true})).await.unwrap();
        service.create(&json!({"title": "open"})).await.unwrap();

        let done = service.list(&list_query(Some("TRUE"), None)).await.unwrap();
        assert_eq!(done.len(), 1);
        assert!(done[0].completed);

        let open = service.list(&list_query(Some("nope"), None)).await.unwrap();
        assert_eq!(open.len(), 1);
        assert!(!open[0].completed);
    }

    #[tokio::test]
    async fn list_rejects_bad_window() {
        let err = service()
            .list(&list_query(None, Some("week")))
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::InvalidWindow(_)));
    }
}
