use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use odisha_shared::errors::{AppError, AppResult};
use odisha_shared::types::auth::{AuthUser, UserRole};
use odisha_shared::types::ApiResponse;

use crate::models::Credential;
use crate::schema::credentials;
use crate::services::session_service;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub role: UserRole,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SessionResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let credential: Credential = credentials::table
        .find(user.id)
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    let role = session_service::role_of(&mut conn, credential.id)?;

    Ok(Json(ApiResponse::ok(SessionResponse {
        id: credential.id,
        email: credential.email,
        role,
        created_at: credential.created_at,
    })))
}
