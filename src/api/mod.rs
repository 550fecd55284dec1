//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.
//! The API is the presentation layer: it only reads snapshots and issues
//! quiz commands.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/answer", post(answer_handler))
        .route("/next", post(next_handler))
        .route("/previous", post(previous_handler))
        .route("/goto/:index", post(goto_handler))
        .route("/restart", post(restart_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
