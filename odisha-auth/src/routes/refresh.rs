use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::TokenPair;
use odisha_shared::types::ApiResponse;

use crate::models::RefreshToken;
use crate::schema::refresh_tokens;
use crate::services::{session_service, token_service};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Rotate: the presented token is revoked and a fresh pair issued.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let token_hash = token_service::hash_token(&req.refresh_token);
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let stored: RefreshToken = refresh_tokens::table
        .filter(refresh_tokens::token_hash.eq(&token_hash))
        .first(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::TokenInvalid, "invalid refresh token"))?;

    if !stored.is_usable(chrono::Utc::now()) {
        return Err(AppError::new(ErrorCode::RefreshTokenRevoked, "refresh token revoked or expired"));
    }

    diesel::update(refresh_tokens::table.find(stored.id))
        .set(refresh_tokens::revoked_at.eq(Some(chrono::Utc::now())))
        .execute(&mut conn)?;

    let token_pair = session_service::issue(&mut conn, &state.config, stored.credential_id)?;

    tracing::debug!(user_id = %stored.credential_id, "refresh token rotated");

    Ok(Json(ApiResponse::ok(token_pair)))
}
