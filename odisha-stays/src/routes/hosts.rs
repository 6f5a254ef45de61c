use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::AppResult;
use odisha_shared::middleware::AdminUser;
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::models::{HostListing, HostPatch, HostProfile};
use crate::services::host_service::{self, CreateHostRequest};
use crate::AppState;

/// Best-effort removal of stored photo objects once their rows are gone.
async fn purge_photo_objects(state: &AppState, urls: Vec<String>) {
    let Some(minio) = &state.minio else { return };
    for url in urls {
        if let Err(e) = minio.delete_by_url(&url).await {
            tracing::warn!(error = %e, url = %url, "failed to delete photo object");
        }
    }
}

// --- POST /hosts ---

pub async fn become_host(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateHostRequest>,
) -> AppResult<Json<ApiResponse<HostProfile>>> {
    let host = host_service::become_host(&state, user.id, req)?;
    Ok(Json(ApiResponse::ok(host)))
}

// --- GET /hosts ---

pub async fn browse(State(state): State<Arc<AppState>>) -> AppResult<Json<ApiResponse<Vec<HostListing>>>> {
    Ok(Json(ApiResponse::ok(state.store.list_hosts()?)))
}

// --- GET /hosts/:id ---

pub async fn get_host(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<HostProfile>>> {
    Ok(Json(ApiResponse::ok(host_service::get(&state, id)?)))
}

// --- GET /hosts/me ---

pub async fn get_mine(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<HostProfile>>> {
    Ok(Json(ApiResponse::ok(host_service::mine(&state, user.id)?)))
}

// --- PATCH /hosts/me ---

pub async fn update_mine(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<HostPatch>,
) -> AppResult<Json<ApiResponse<HostProfile>>> {
    let host = host_service::mine(&state, user.id)?;
    let updated = host_service::update(&state, host.id, patch)?;
    Ok(Json(ApiResponse::ok(updated)))
}

// --- DELETE /hosts/me ---

pub async fn delete_mine(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let host = host_service::mine(&state, user.id)?;
    let urls = host_service::delete(&state, host.id)?;
    purge_photo_objects(&state, urls).await;

    Ok(Json(ApiResponse::ok(json!({ "deleted": true }))))
}

// --- GET /admin/hosts ---

pub async fn admin_list(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<HostListing>>>> {
    Ok(Json(ApiResponse::ok(state.store.list_hosts()?)))
}

// --- PATCH /admin/hosts/:id ---

pub async fn admin_update(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<HostPatch>,
) -> AppResult<Json<ApiResponse<HostProfile>>> {
    let host = host_service::update(&state, id, patch)?;
    tracing::info!(host_id = %id, admin_id = %admin.id, "host updated by admin");
    Ok(Json(ApiResponse::ok(host)))
}

// --- DELETE /admin/hosts/:id ---

pub async fn admin_delete(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let urls = host_service::delete(&state, id)?;
    purge_photo_objects(&state, urls).await;

    tracing::info!(host_id = %id, admin_id = %admin.id, "host deleted by admin");
    Ok(Json(ApiResponse::ok(json!({ "deleted": true }))))
}
