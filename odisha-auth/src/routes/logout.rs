use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use odisha_shared::errors::{AppError, AppResult};
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::schema::refresh_tokens;
use crate::services::token_service;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

/// Revokes the given refresh token, or every live token of the caller.
pub async fn logout(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    body: Option<Json<LogoutRequest>>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let live = refresh_tokens::table
        .filter(refresh_tokens::credential_id.eq(user.id))
        .filter(refresh_tokens::revoked_at.is_null());

    let revoked = match req.refresh_token {
        Some(token) => diesel::update(
            live.filter(refresh_tokens::token_hash.eq(token_service::hash_token(&token))),
        )
        .set(refresh_tokens::revoked_at.eq(Some(chrono::Utc::now())))
        .execute(&mut conn)?,
        None => diesel::update(live)
            .set(refresh_tokens::revoked_at.eq(Some(chrono::Utc::now())))
            .execute(&mut conn)?,
    };

    tracing::info!(user_id = %user.id, revoked, "user logged out");

    Ok(Json(ApiResponse::ok(serde_json::json!({ "revoked": revoked })).with_message("logged out")))
}
