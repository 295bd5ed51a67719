//! HTTP bridge for the UI process
//!
//! The popup and overlay live outside this process; they speak the message
//! channel as JSON over HTTP.

pub mod handlers;
pub mod responses;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{badge::Badge, channel::EngineHandle};
use handlers::*;

/// Shared state for the HTTP handlers
#[derive(Debug, Clone)]
pub struct ApiState {
    pub engine: EngineHandle,
    pub badge: watch::Receiver<Badge>,
}

impl ApiState {
    pub fn new(engine: EngineHandle, badge: watch::Receiver<Badge>) -> Self {
        Self { engine, badge }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/message", post(message_handler))
        .route("/status", get(status_handler))
        .route("/badge", get(badge_handler))
        .route("/health", get(health_handler))
        // Extension pages call from a chrome-extension:// origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
