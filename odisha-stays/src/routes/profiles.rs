use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::middleware::AdminUser;
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::models::{Profile, ProfilePatch};
use crate::services::profile_service::{self, SurferCard};
use crate::AppState;

// --- GET /profiles/me ---

pub async fn get_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let profile = profile_service::get(&state, user.id)?;
    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /profiles/me ---

pub async fn update_me(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let patch = profile_service::normalize_patch(patch);
    patch.validate()?;

    let profile = state.store.upsert_profile(user.id, &patch)?;
    tracing::info!(user_id = %user.id, "profile updated");

    Ok(Json(ApiResponse::ok(profile)))
}

// --- GET /profiles/:id ---

pub async fn surfer_card(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SurferCard>>> {
    let card = profile_service::card(&state, id)?;
    Ok(Json(ApiResponse::ok(card)))
}

// --- GET /admin/profiles ---

pub async fn admin_list(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Profile>>>> {
    Ok(Json(ApiResponse::ok(state.store.list_profiles()?)))
}

// --- PATCH /admin/profiles/:id ---

pub async fn admin_update(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProfilePatch>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let patch = profile_service::normalize_patch(patch);
    patch.validate()?;

    let profile = state
        .store
        .update_profile(id, &patch)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    tracing::info!(profile_id = %id, admin_id = %admin.id, "profile updated by admin");
    Ok(Json(ApiResponse::ok(profile)))
}
