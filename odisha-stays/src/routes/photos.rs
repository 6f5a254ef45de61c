use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::models::{HostPhoto, NewHostPhoto};
use crate::services::host_service;
use crate::AppState;

fn upload_failed(message: impl Into<String>) -> AppError {
    AppError::new(ErrorCode::PhotoUploadFailed, message)
}

fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

struct UploadedFile {
    content_type: String,
    data: Vec<u8>,
}

// --- POST /hosts/me/photos ---

pub async fn upload_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<HostPhoto>>> {
    let minio = state.minio.as_ref().ok_or_else(|| {
        AppError::new(ErrorCode::ServiceUnavailable, "photo storage is not configured")
    })?;
    let host = host_service::mine(&state, user.id)?;

    let mut file: Option<UploadedFile> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_failed(format!("failed to read multipart: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| upload_failed(format!("failed to read file data: {e}")))?;
                file = Some(UploadedFile { content_type, data: data.to_vec() });
            }
            Some("caption") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| upload_failed(format!("failed to read caption: {e}")))?;
                caption = Some(text.trim().to_string()).filter(|c| !c.is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| upload_failed("no file provided"))?;
    let ext = image_extension(&file.content_type)
        .ok_or_else(|| upload_failed("unsupported image format, accepted: jpeg, png, webp, gif"))?;

    let key = format!("hosts/{}/{}.{}", host.id, Uuid::now_v7(), ext);
    let photo_url = minio
        .upload(&key, file.data, &file.content_type)
        .await
        .map_err(|e| upload_failed(e.to_string()))?;

    let photo = state.store.add_photo(NewHostPhoto {
        host_id: host.id,
        photo_url,
        caption,
    })?;

    tracing::info!(host_id = %host.id, photo_id = %photo.id, "host photo uploaded");
    Ok(Json(ApiResponse::ok(photo)))
}

// --- GET /hosts/:id/photos ---

pub async fn list_photos(
    State(state): State<Arc<AppState>>,
    Path(host_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<HostPhoto>>>> {
    Ok(Json(ApiResponse::ok(state.store.list_photos(host_id)?)))
}

// --- DELETE /hosts/me/photos/:photo_id ---

pub async fn delete_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(photo_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let host = host_service::mine(&state, user.id)?;
    let photo = state
        .store
        .get_photo(photo_id)?
        .filter(|p| p.host_id == host.id)
        .ok_or_else(|| AppError::new(ErrorCode::PhotoNotFound, "photo not found"))?;

    state.store.delete_photo(photo.id)?;

    if let Some(minio) = &state.minio {
        if let Err(e) = minio.delete_by_url(&photo.photo_url).await {
            tracing::warn!(error = %e, photo_id = %photo.id, "failed to delete photo object");
        }
    }

    tracing::info!(host_id = %host.id, photo_id = %photo.id, "host photo deleted");
    Ok(Json(ApiResponse::ok(json!({ "deleted": true }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_web_images_are_accepted() {
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/webp"), Some("webp"));
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension("image/svg+xml"), None);
    }
}
