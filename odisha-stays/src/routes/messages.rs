use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::AppResult;
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::models::Message;
use crate::services::message_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub message: String,
    pub stay_request_id: Option<Uuid>,
}

// --- POST /messages ---

pub async fn send(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let message = message_service::send(
        &state,
        user.id,
        req.receiver_id,
        &req.message,
        req.stay_request_id,
    )?;
    Ok(Json(ApiResponse::ok(message)))
}

// --- GET /messages ---

pub async fn list(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    Ok(Json(ApiResponse::ok(state.store.messages_for_user(user.id)?)))
}

// --- GET /messages/with/:user_id ---

pub async fn conversation(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(other): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    Ok(Json(ApiResponse::ok(state.store.conversation(user.id, other)?)))
}
