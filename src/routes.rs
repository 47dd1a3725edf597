//! REST endpoints for driving conversations over HTTP.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::bot::HelpdeskBot;
use crate::dialogs::Activity;

/// Shared state for helpdesk routes.
#[derive(Clone)]
pub struct HelpdeskRouteState {
    pub bot: Arc<HelpdeskBot>,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub activities: Vec<Activity>,
}

fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!("Request failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": e.to_string()})),
    )
        .into_response()
}

/// GET /health
async fn health(State(state): State<HelpdeskRouteState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "name": state.bot.config().name,
    }))
}

/// POST /api/conversations/{id}/messages
///
/// Runs one turn with `{"text": ...}` and returns the replies.
async fn post_message(
    State(state): State<HelpdeskRouteState>,
    Path(conversation_id): Path<String>,
    Json(body): Json<MessageRequest>,
) -> impl IntoResponse {
    match state.bot.handle_message(&conversation_id, &body.text).await {
        Ok(activities) => Json(MessageResponse { activities }).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/conversations/{id}/profile
///
/// Returns the entity profile, or 404 before the conversation's first turn.
async fn get_profile(
    State(state): State<HelpdeskRouteState>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    match state.bot.profile(&conversation_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No profile for this conversation"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/conversations/{id}/dialogs
async fn cancel_dialogs(
    State(state): State<HelpdeskRouteState>,
    Path(conversation_id): Path<String>,
) -> impl IntoResponse {
    match state.bot.cancel_all(&conversation_id).await {
        Ok(cancelled) => Json(serde_json::json!({"cancelled": cancelled})).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Build the helpdesk REST routes.
pub fn helpdesk_routes(state: HelpdeskRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/conversations/{id}/messages", post(post_message))
        .route("/api/conversations/{id}/profile", get(get_profile))
        .route("/api/conversations/{id}/dialogs", delete(cancel_dialogs))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
