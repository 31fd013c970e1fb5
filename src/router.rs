//! Request routing for the relay endpoints.

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::handlers;
use crate::storage::StorageHandles;

/// Application state shared between handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<StorageHandles>,
}

/// Creates the router for the HTTP endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/uploadfile", post(handlers::upload_file))
        .route("/storetable", post(handlers::store_table))
        .route("/healthz", get(health))
        .with_state(state)
}

/// Liveness probe.
async fn health() -> StatusCode {
    StatusCode::OK
}
