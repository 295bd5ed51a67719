//! HTTP endpoint handlers

use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{debug, error, warn};

use super::{
    responses::{HealthResponse, StatusResponse},
    ApiState,
};
use crate::{
    badge::Badge,
    channel::{Message, Reply},
};

/// Handle POST /message - deliver one message to the engine
pub async fn message_handler(
    State(state): State<ApiState>,
    Json(message): Json<Message>,
) -> Result<Json<Reply>, StatusCode> {
    let action = message.action();
    let wants_status = matches!(message, Message::GetTimerStatus);

    match state.engine.request(message).await {
        Ok(reply) => {
            debug!("{} handled", action);
            Ok(Json(reply))
        }
        Err(e) if wants_status => {
            warn!("Engine unreachable for {} ({}), serving last known status", action, e);
            Ok(Json(Reply::Status(state.engine.last_known_status())))
        }
        Err(e) => {
            error!("Failed to deliver {}: {}", action, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /status - timer status plus the current badge
pub async fn status_handler(State(state): State<ApiState>) -> Json<StatusResponse> {
    let timer = state.engine.status().await;
    Json(StatusResponse {
        timer,
        badge: state.badge.borrow().clone(),
    })
}

/// Handle GET /badge - what the badge shows right now
pub async fn badge_handler(State(state): State<ApiState>) -> Json<Badge> {
    Json(state.badge.borrow().clone())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
