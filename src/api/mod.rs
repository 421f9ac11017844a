//! HTTP API module
//!
//! The intent surface of the timer: every mutating route answers with the
//! full updated snapshot, and /events streams each new snapshot to any
//! number of passive observers.

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
        .route("/state", get(get_state_handler).delete(reset_handler))
        .route("/toggle", post(toggle_handler))
        .route("/settings", post(update_settings_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
