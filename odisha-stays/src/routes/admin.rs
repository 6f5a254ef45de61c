use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::AppResult;
use odisha_shared::middleware::AdminUser;
use odisha_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::domain::StayStatus;
use crate::models::{AdminStayRequest, Message};
use crate::services::{message_service, stay_service};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

impl StatusFilter {
    fn parse(&self) -> AppResult<Option<StayStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(raw) => Ok(Some(raw.parse()?)),
        }
    }
}

// --- GET /admin/stay-requests ---

pub async fn list_stay_requests(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<StatusFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminStayRequest>>>> {
    let page = stay_service::admin_list(&state, filter.parse()?, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

// --- DELETE /admin/stay-requests/:id ---

pub async fn delete_stay_request(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    stay_service::admin_delete(&state, admin.id, id)?;
    Ok(Json(ApiResponse::ok(json!({ "deleted": true }))))
}

// --- GET /admin/messages ---

pub async fn list_messages(
    AdminUser(_admin): AdminUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    Ok(Json(ApiResponse::ok(state.store.list_messages()?)))
}

// --- DELETE /admin/messages/:id ---

pub async fn delete_message(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    message_service::admin_delete(&state, admin.id, id)?;
    Ok(Json(ApiResponse::ok(json!({ "deleted": true }))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use odisha_shared::errors::ErrorCode;

    fn filter(status: Option<&str>) -> StatusFilter {
        StatusFilter { status: status.map(str::to_string) }
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(filter(None).parse().unwrap(), None);
        assert_eq!(filter(Some("all")).parse().unwrap(), None);
        assert_eq!(filter(Some("accepted")).parse().unwrap(), Some(StayStatus::Approved));
        assert_eq!(filter(Some("pending")).parse().unwrap(), Some(StayStatus::Pending));

        let err = filter(Some("maybe")).parse().unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::InvalidStayStatus);
    }
}
