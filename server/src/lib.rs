//! HTTP front end for the todo service.
//!
//! Routes live under `/api/v1`. Handlers stay thin: they pull the raw body,
//! path id and query string out of the request, hand them to
//! `TodoService`, and let `ApiError` turn failures into JSON responses.

pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use todo_core::{ListQuery, Todo, TodoService};
use tokio::net::TcpListener;

pub use config::Config;
pub use error::ApiError;
pub use store::SqliteStore;

pub const API_PREFIX: &str = "/api/v1";

pub fn app(service: TodoService) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{todo_id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        );
    Router::new()
        .nest(API_PREFIX, api)
        .fallback(unknown_route)
        .with_state(service)
}

/// Serve until Ctrl-C.
pub async fn run(listener: TcpListener, service: TodoService) -> Result<(), std::io::Error> {
    axum::serve(listener, app(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

fn todo_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::UnknownRoute)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_todos(
    State(service): State<TodoService>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(pairs) = query?;
    let query = ListQuery::from_pairs(pairs);
    let todos = service.list(&query).await?;
    tracing::debug!(count = todos.len(), "listed todos");
    Ok(Json(todos))
}

async fn get_todo(
    State(service): State<TodoService>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path)?;
    Ok(Json(service.get(id).await?))
}

async fn create_todo(
    State(service): State<TodoService>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(body) = body?;
    let todo = service.create(&body).await?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(service): State<TodoService>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(path)?;
    let Json(body) = body?;
    let todo = service.update(id, &body).await?;
    tracing::info!(id, "updated todo");
    Ok(Json(todo))
}

/// Deleting a missing todo answers `200 {}`.
async fn delete_todo(
    State(service): State<TodoService>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = todo_id(path)?;
    match service.delete(id).await? {
        Some(todo) => {
            tracing::info!(id, "deleted todo");
            Ok(Json(todo).into_response())
        }
        None => Ok(Json(json!({})).into_response()),
    }
}

async fn unknown_route() -> ApiError {
    ApiError::UnknownRoute
}
