//! HTTP API for the todo service.
//!
//! The router is built from an injected [`AppState`] so tests can run the
//! whole stack against an in-memory database.

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

pub use db::Db;
pub use error::ApiError;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
}

/// Build the router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/:id",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
}
