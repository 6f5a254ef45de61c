//! Read endpoints for every catalog kind plus admin curation.
//!
//! The five kinds share one shape (`list` ordered by name, `get`, and admin
//! `create`/`update`/`delete`), so the handlers are stamped out per table.

use uuid::Uuid;

use odisha_shared::errors::{AppError, ErrorCode};

fn content_not_found(kind: &str, id: Uuid) -> AppError {
    AppError::new(ErrorCode::ContentNotFound, format!("{kind} {id} not found"))
}

fn map_update_error(err: diesel::result::Error) -> AppError {
    match err {
        diesel::result::Error::QueryBuilderError(_) => AppError::bad_request("no fields to update"),
        other => other.into(),
    }
}

macro_rules! catalog_handlers {
    ($kind:literal, $table:ident, $row:ty, $new:ty, $patch:ty) => {
        use axum::extract::{Path, State};
        use axum::Json;
        use diesel::prelude::*;
        use std::sync::Arc;
        use uuid::Uuid;
        use validator::Validate;

        use odisha_shared::errors::{AppError, AppResult};
        use odisha_shared::middleware::AdminUser;
        use odisha_shared::types::ApiResponse;

        use crate::schema::$table;
        use crate::AppState;

        pub async fn list(
            State(state): State<Arc<AppState>>,
        ) -> AppResult<Json<ApiResponse<Vec<$row>>>> {
            let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
            let rows = $table::table
                .order($table::name.asc())
                .load::<$row>(&mut conn)?;
            Ok(Json(ApiResponse::ok(rows)))
        }

        pub async fn get(
            State(state): State<Arc<AppState>>,
            Path(id): Path<Uuid>,
        ) -> AppResult<Json<ApiResponse<$row>>> {
            let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
            let row = $table::table
                .find(id)
                .first::<$row>(&mut conn)
                .optional()?
                .ok_or_else(|| super::content_not_found($kind, id))?;
            Ok(Json(ApiResponse::ok(row)))
        }

        pub async fn create(
            AdminUser(admin): AdminUser,
            State(state): State<Arc<AppState>>,
            Json(req): Json<$new>,
        ) -> AppResult<Json<ApiResponse<$row>>> {
            req.validate()?;
            let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
            let row: $row = diesel::insert_into($table::table)
                .values(&req)
                .get_result(&mut conn)?;

            tracing::info!(kind = $kind, id = %row.id, admin_id = %admin.id, "content created");
            Ok(Json(ApiResponse::ok(row)))
        }

        pub async fn update(
            AdminUser(admin): AdminUser,
            State(state): State<Arc<AppState>>,
            Path(id): Path<Uuid>,
            Json(patch): Json<$patch>,
        ) -> AppResult<Json<ApiResponse<$row>>> {
            patch.validate()?;
            let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
            let row = diesel::update($table::table.find(id))
                .set(&patch)
                .get_result::<$row>(&mut conn)
                .optional()
                .map_err(super::map_update_error)?
                .ok_or_else(|| super::content_not_found($kind, id))?;

            tracing::info!(kind = $kind, id = %row.id, admin_id = %admin.id, "content updated");
            Ok(Json(ApiResponse::ok(row)))
        }

        pub async fn delete(
            AdminUser(admin): AdminUser,
            State(state): State<Arc<AppState>>,
            Path(id): Path<Uuid>,
        ) -> AppResult<Json<ApiResponse<&'static str>>> {
            let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
            let deleted = diesel::delete($table::table.find(id)).execute(&mut conn)?;
            if deleted == 0 {
                return Err(super::content_not_found($kind, id));
            }

            tracing::info!(kind = $kind, id = %id, admin_id = %admin.id, "content deleted");
            Ok(Json(ApiResponse::ok("deleted")))
        }
    };
}

pub mod places {
    use crate::models::{NewPlace, Place, PlacePatch};
    catalog_handlers!("place", places, Place, NewPlace, PlacePatch);
}

pub mod foods {
    use crate::models::{Food, FoodPatch, NewFood};
    catalog_handlers!("food", foods, Food, NewFood, FoodPatch);
}

pub mod festivals {
    use crate::models::{Festival, FestivalPatch, NewFestival};
    catalog_handlers!("festival", festivals, Festival, NewFestival, FestivalPatch);
}

pub mod tribes {
    use crate::models::{NewTribe, Tribe, TribePatch};
    catalog_handlers!("tribe", tribes, Tribe, NewTribe, TribePatch);
}

pub mod districts {
    use crate::models::{District, DistrictPatch, NewDistrict};
    catalog_handlers!("district", districts, District, NewDistrict, DistrictPatch);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_a_bad_request() {
        let err = map_update_error(diesel::result::Error::QueryBuilderError(
            "There are no changes to save".into(),
        ));
        assert_eq!(err.error_code(), ErrorCode::BadRequest);

        let err = map_update_error(diesel::result::Error::NotFound);
        assert_eq!(err.error_code(), ErrorCode::NotFound);
    }

    #[test]
    fn not_found_names_the_kind() {
        let id = Uuid::nil();
        let err = content_not_found("festival", id);
        assert_eq!(err.error_code(), ErrorCode::ContentNotFound);
        assert!(err.to_string().contains("festival"));
    }
}
