//! HTTP server exposing a to-do list as MCP tools and as a REST API.
//!
//! # Design
//! One [`store::Store`] per process, created by the caller and handed to
//! [`AppState::new`]. The JSON-RPC endpoint and the REST routes are thin
//! adapters over that same instance; neither holds business logic of its own.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod mcp;
pub mod rest;
pub mod store;

pub use handlers::{CommandHandlers, SharedStore};
pub use store::Store;
pub use todo_core::Todo;

#[derive(Clone)]
pub struct AppState {
    pub handlers: CommandHandlers,
    /// Public base URL for widget assets, if configured.
    pub base_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Store, base_url: Option<String>) -> Self {
        Self {
            handlers: CommandHandlers::new(Arc::new(RwLock::new(store))),
            base_url: base_url.map(Arc::from),
        }
    }

    pub fn store(&self) -> &SharedStore {
        self.handlers.store()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/mcp",
            post(mcp::handle_post).fallback(mcp::method_not_allowed),
        )
        .route("/api/todos", get(rest::list_todos).post(rest::create_todo))
        .route(
            "/api/todos/{id}",
            get(rest::get_todo).put(rest::update_todo).delete(rest::delete_todo),
        )
        .route("/api/todos/{id}/toggle", post(rest::toggle_todo))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Router over a fresh, empty store.
pub fn app() -> Router {
    router(AppState::new(Store::new(), None))
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
