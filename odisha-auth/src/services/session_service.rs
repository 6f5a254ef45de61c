use chrono::{Duration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use odisha_shared::errors::AppError;
use odisha_shared::types::auth::{TokenPair, UserRole};

use crate::config::AppConfig;
use crate::models::NewRefreshToken;
use crate::schema::{refresh_tokens, user_roles};
use crate::services::token_service;

/// Admin if any `user_roles` row says so.
pub fn role_of(conn: &mut PgConnection, user_id: Uuid) -> Result<UserRole, AppError> {
    let roles: Vec<String> = user_roles::table
        .filter(user_roles::user_id.eq(user_id))
        .select(user_roles::role)
        .load(conn)?;

    let is_admin = roles
        .iter()
        .any(|r| r.parse::<UserRole>().map(|r| r == UserRole::Admin).unwrap_or(false));

    Ok(if is_admin { UserRole::Admin } else { UserRole::User })
}

/// Sign a token pair for the user and persist the refresh token hash.
pub fn issue(
    conn: &mut PgConnection,
    config: &AppConfig,
    user_id: Uuid,
) -> Result<TokenPair, AppError> {
    let role = role_of(conn, user_id)?;
    let (pair, refresh_hash) =
        token_service::create_token_pair(user_id, role, &config.jwt_secret, config.jwt_access_ttl)?;

    diesel::insert_into(refresh_tokens::table)
        .values(&NewRefreshToken {
            credential_id: user_id,
            token_hash: refresh_hash,
            expires_at: Utc::now() + Duration::seconds(config.jwt_refresh_ttl),
        })
        .execute(conn)?;

    Ok(pair)
}
