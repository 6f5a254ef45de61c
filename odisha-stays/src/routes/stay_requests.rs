use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::AppResult;
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::domain::Decision;
use crate::models::{IncomingRequest, OutgoingRequest, StayRequest, SurferReview};
use crate::services::stay_service;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateStayRequest {
    pub host_id: Uuid,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewSurferRequest {
    pub rating: i32,
    pub review_text: String,
}

// --- POST /stay-requests ---

pub async fn create(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStayRequest>,
) -> AppResult<Json<ApiResponse<StayRequest>>> {
    let request = stay_service::create(&state, user.id, req.host_id, req.message)?;
    Ok(Json(ApiResponse::ok(request)))
}

// --- GET /stay-requests/incoming ---

pub async fn incoming(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<IncomingRequest>>>> {
    Ok(Json(ApiResponse::ok(stay_service::incoming(&state, user.id)?)))
}

// --- GET /stay-requests/outgoing ---

pub async fn outgoing(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<OutgoingRequest>>>> {
    Ok(Json(ApiResponse::ok(stay_service::outgoing(&state, user.id)?)))
}

// --- POST /stay-requests/:id/accept ---

pub async fn accept(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StayRequest>>> {
    let request = stay_service::decide(&state, &user, id, Decision::Approve)?;
    Ok(Json(ApiResponse::ok(request)))
}

// --- POST /stay-requests/:id/reject ---

pub async fn reject(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<StayRequest>>> {
    let request = stay_service::decide(&state, &user, id, Decision::Reject)?;
    Ok(Json(ApiResponse::ok(request)))
}

// --- POST /stay-requests/:id/review ---

pub async fn review_surfer(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewSurferRequest>,
) -> AppResult<Json<ApiResponse<SurferReview>>> {
    let review = stay_service::review_surfer(&state, user.id, id, req.rating, &req.review_text)?;
    Ok(Json(ApiResponse::ok(review)))
}
