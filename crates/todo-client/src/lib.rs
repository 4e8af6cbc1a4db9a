//! Client data layer for the todo API.
//!
//! [`ApiClient`] issues the HTTP requests; [`QueryClient`] layers a keyed
//! cache on top with request deduplication and mutation-driven invalidation.

pub mod api;
pub mod cache;
pub mod error;
pub mod types;

pub use api::ApiClient;
pub use cache::{QueryClient, QueryKey, QueryState};
pub use error::ClientError;
pub use types::{CreateTodo, Deleted, Todo, UpdateTodo};
