use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::TokenPair;
use odisha_shared::types::ApiResponse;

use crate::models::Credential;
use crate::schema::credentials;
use crate::services::{auth_service, session_service};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let credential: Credential = credentials::table
        .filter(credentials::email.eq(auth_service::normalize_email(&req.email)))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"))?;

    if !auth_service::verify_password(&req.password, &credential.password_hash)? {
        return Err(AppError::new(ErrorCode::InvalidCredentials, "invalid email or password"));
    }

    let token_pair = session_service::issue(&mut conn, &state.config, credential.id)?;

    tracing::info!(user_id = %credential.id, "user logged in");

    Ok(Json(ApiResponse::ok(token_pair)))
}
