//! Error types for the todo service.
//!
//! # Design
//! Every client-facing variant carries the message that ends up in the
//! `{"error": ...}` response body, so the HTTP layer only has to pick a
//! status code. `NotFound` and `Storage` are the only variants that do not
//! map to 400.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed source error from a repository implementation.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Errors returned by `TodoService` and `TodoRepository` implementations.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The request body was valid JSON but not an object.
    #[error("Request body must be a JSON object")]
    InvalidBody,

    /// The payload contained keys outside the allowed set. Sorted.
    #[error("Extra fields are not allowed: {}", .0.join(", "))]
    ExtraFields(Vec<String>),

    #[error("Missing title field")]
    MissingTitle,

    /// An update payload tried to set `id`.
    #[error("Cannot change id field")]
    ImmutableId,

    /// A known key held a value of the wrong JSON type.
    #[error("Invalid value for {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid ISO-8601 timestamp for {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    /// The `window` list parameter was not an integer number of days, or
    /// the resulting bound overflowed.
    #[error("Invalid window value: {0}")]
    InvalidWindow(String),

    #[error("Todo not found")]
    NotFound,

    #[error("storage failure: {0}")]
    Storage(#[source] BoxError),
}

impl TodoError {
    /// Wrap a backend error.
    pub fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        TodoError::Storage(Box::new(err))
    }

    /// True for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TodoError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn extra_fields_message_lists_keys() {
        let err = TodoError::ExtraFields(vec!["bar".to_string(), "foo".to_string()]);
        assert_eq!(err.to_string(), "Extra fields are not allowed: bar, foo");
    }

    #[test]
    fn storage_errors_are_not_client_errors() {
        let err = TodoError::storage(std::io::Error::other("disk gone"));
        assert!(!err.is_client_error());
        assert!(err.source().is_some());
        assert!(TodoError::NotFound.is_client_error());
    }
}
