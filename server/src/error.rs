//! Mapping from service and extractor errors to HTTP responses.
//!
//! Every failure is rendered as `{"error": "<message>"}`. Storage failures
//! are logged in full and answered with a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use todo_core::TodoError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),

    /// No route matched, including path segments that are not integer ids.
    #[error("Not found")]
    UnknownRoute,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Todo(TodoError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Todo(err) if !err.is_client_error() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Todo(_) => StatusCode::BAD_REQUEST,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Query(rejection) => rejection.status(),
            ApiError::UnknownRoute => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        assert_eq!(ApiError::from(TodoError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(TodoError::MissingTitle).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(TodoError::InvalidWindow("x".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        let storage = TodoError::storage(std::io::Error::other("locked"));
        assert_eq!(
            ApiError::from(storage).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_is_the_domain_message() {
        let err = ApiError::from(TodoError::ImmutableId);
        assert_eq!(err.to_string(), "Cannot change id field");
    }
}
