use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::{AppError, AppResult};
use odisha_shared::middleware::AdminUser;
use odisha_shared::types::auth::UserRole;
use odisha_shared::types::ApiResponse;

use crate::models::NewUserRole;
use crate::schema::{credentials, user_roles};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub user_id: Uuid,
    pub role: UserRole,
}

// --- PUT /admin/roles/:user_id ---

pub async fn set_role(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> AppResult<Json<ApiResponse<RoleResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let exists: i64 = credentials::table
        .find(user_id)
        .count()
        .get_result(&mut conn)?;
    if exists == 0 {
        return Err(AppError::not_found("user not found"));
    }

    diesel::insert_into(user_roles::table)
        .values(&NewUserRole {
            user_id,
            role: req.role.to_string(),
        })
        .on_conflict(user_roles::user_id)
        .do_update()
        .set(user_roles::role.eq(req.role.to_string()))
        .execute(&mut conn)?;

    crate::events::publisher::publish_role_changed(&state.rabbitmq, admin.id, user_id, req.role).await;

    tracing::info!(admin_id = %admin.id, user_id = %user_id, role = %req.role, "role changed");

    Ok(Json(ApiResponse::ok(RoleResponse { user_id, role: req.role })))
}
