//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is the stored record and the wire shape at the same time: every
//! field is always serialized, and nullable fields are emitted as `null`.
//! Timestamps are naive UTC values, which serde renders as ISO-8601 strings
//! without an offset.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single stored todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A validated create payload. The store assigns `id` and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline_at: Option<NaiveDateTime>,
}

/// A validated update payload.
///
/// The outer `Option` records whether the key was present in the body. For
/// nullable columns the inner `Option` is the new value, so `Some(None)`
/// clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub deadline_at: Option<Option<NaiveDateTime>>,
}

impl TodoChanges {
    /// Overwrite every field that was present in the payload.
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(deadline_at) = self.deadline_at {
            todo.deadline_at = deadline_at;
        }
    }
}

/// Conjunctive list filter. An unset field matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    /// Keep only records whose deadline is strictly before this instant.
    /// Records without a deadline never match.
    pub deadline_before: Option<NaiveDateTime>,
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        if let Some(bound) = self.deadline_before {
            match todo.deadline_at {
                Some(deadline) if deadline < bound => {}
                _ => return false,
            }
        }
        true
    }
}

/// Raw list query parameters, exactly as they arrived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub completed: Option<String>,
    pub window: Option<String>,
}

impl ListQuery {
    /// Build from decoded query-string pairs. The first occurrence of a
    /// repeated key wins and unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = ListQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "completed" => &mut query.completed,
                "window" => &mut query.window,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}
