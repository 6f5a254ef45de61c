use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::{TokenPair, UserRole};
use odisha_shared::types::ApiResponse;

use crate::models::{Credential, NewCredential, NewUserRole};
use crate::schema::{credentials, user_roles};
use crate::services::{auth_service, session_service};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub password: String,
    #[validate(length(max = 120, message = "full name is too long"))]
    pub full_name: Option<String>,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    req.validate()?;
    auth_service::validate_password(&req.password)?;

    let email = auth_service::normalize_email(&req.email);
    let password_hash = auth_service::hash_password(&req.password)?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: i64 = credentials::table
        .filter(credentials::email.eq(&email))
        .count()
        .get_result(&mut conn)?;
    if exists > 0 {
        return Err(AppError::new(ErrorCode::EmailAlreadyExists, "email already registered"));
    }

    let credential: Credential = conn.transaction(|conn| {
        let credential: Credential = diesel::insert_into(credentials::table)
            .values(&NewCredential { email, password_hash })
            .get_result(conn)?;

        diesel::insert_into(user_roles::table)
            .values(&NewUserRole {
                user_id: credential.id,
                role: UserRole::User.to_string(),
            })
            .execute(conn)?;

        Ok::<_, diesel::result::Error>(credential)
    })?;

    let token_pair = session_service::issue(&mut conn, &state.config, credential.id)?;

    let full_name = req
        .full_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    crate::events::publisher::publish_user_registered(
        &state.rabbitmq,
        credential.id,
        &credential.email,
        full_name,
    )
    .await;

    tracing::info!(user_id = %credential.id, email = %credential.email, "user registered");

    Ok(Json(ApiResponse::ok(token_pair)))
}
