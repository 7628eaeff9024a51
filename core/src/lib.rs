//! Domain core for the todo service.
//!
//! # Overview
//! Validates JSON payloads and list parameters, and drives a pluggable
//! `TodoRepository`. Nothing here knows about HTTP or SQL; the server crate
//! supplies both.
//!
//! # Design
//! - `TodoService` is the single entry point for every operation.
//! - Storage is injected as `Arc<dyn TodoRepository>`; `MemoryStore` is the
//!   in-process implementation used by tests.
//! - Errors are one `TodoError` enum whose `Display` is the client-facing
//!   message.

pub mod error;
pub mod memory;
pub mod payload;
pub mod repository;
pub mod service;
pub mod types;

pub use error::TodoError;
pub use memory::MemoryStore;
pub use repository::TodoRepository;
pub use service::{system_clock, Clock, TodoService};
pub use types::{ListQuery, NewTodo, Todo, TodoChanges, TodoFilter};
