use axum::extract::{Path, State};
use axum::Json;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::ApiResponse;

use crate::models::{Festival, Food, NewSavedFestival, NewSavedFood, NewSavedPlace, Place};
use crate::schema::{festivals, foods, places, saved_festivals, saved_foods, saved_places};
use crate::AppState;

/// Content kinds a user can bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedKind {
    Place,
    Food,
    Festival,
}

impl FromStr for SavedKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place" | "places" => Ok(Self::Place),
            "food" | "foods" => Ok(Self::Food),
            "festival" | "festivals" => Ok(Self::Festival),
            other => Err(AppError::new(
                ErrorCode::UnknownContentKind,
                format!("cannot save items of kind '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedItems {
    pub places: Vec<Place>,
    pub foods: Vec<Food>,
    pub festivals: Vec<Festival>,
}

#[derive(Debug, Serialize)]
pub struct SavedIds {
    pub places: Vec<Uuid>,
    pub foods: Vec<Uuid>,
    pub festivals: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub saved: bool,
}

// --- GET /saved ---

pub async fn list_saved(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SavedItems>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let places = saved_places::table
        .inner_join(places::table)
        .filter(saved_places::user_id.eq(user.id))
        .order(saved_places::created_at.desc())
        .select(Place::as_select())
        .load(&mut conn)?;

    let foods = saved_foods::table
        .inner_join(foods::table)
        .filter(saved_foods::user_id.eq(user.id))
        .order(saved_foods::created_at.desc())
        .select(Food::as_select())
        .load(&mut conn)?;

    let festivals = saved_festivals::table
        .inner_join(festivals::table)
        .filter(saved_festivals::user_id.eq(user.id))
        .order(saved_festivals::created_at.desc())
        .select(Festival::as_select())
        .load(&mut conn)?;

    Ok(Json(ApiResponse::ok(SavedItems { places, foods, festivals })))
}

// --- GET /saved/ids ---

pub async fn list_saved_ids(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<SavedIds>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let ids = SavedIds {
        places: saved_places::table
            .filter(saved_places::user_id.eq(user.id))
            .select(saved_places::place_id)
            .load(&mut conn)?,
        foods: saved_foods::table
            .filter(saved_foods::user_id.eq(user.id))
            .select(saved_foods::food_id)
            .load(&mut conn)?,
        festivals: saved_festivals::table
            .filter(saved_festivals::user_id.eq(user.id))
            .select(saved_festivals::festival_id)
            .load(&mut conn)?,
    };

    Ok(Json(ApiResponse::ok(ids)))
}

// --- POST /saved/:kind/:id/toggle ---

pub async fn toggle_saved(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((kind, item_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<ToggleResponse>>> {
    let kind: SavedKind = kind.parse()?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let saved = conn.transaction(|conn| {
        if remove(conn, kind, user.id, item_id)? > 0 {
            return Ok(false);
        }
        ensure_content_exists(conn, kind, item_id)?;
        insert(conn, kind, user.id, item_id)?;
        Ok::<_, AppError>(true)
    })?;

    tracing::debug!(user_id = %user.id, ?kind, item_id = %item_id, saved, "saved item toggled");

    Ok(Json(ApiResponse::ok(ToggleResponse { saved })))
}

// --- DELETE /saved/:kind/:id ---

pub async fn unsave(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path((kind, item_id)): Path<(String, Uuid)>,
) -> AppResult<Json<ApiResponse<ToggleResponse>>> {
    let kind: SavedKind = kind.parse()?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    remove(&mut conn, kind, user.id, item_id)?;

    Ok(Json(ApiResponse::ok(ToggleResponse { saved: false })))
}

fn ensure_content_exists(conn: &mut PgConnection, kind: SavedKind, id: Uuid) -> Result<(), AppError> {
    let count: i64 = match kind {
        SavedKind::Place => places::table.find(id).count().get_result(conn)?,
        SavedKind::Food => foods::table.find(id).count().get_result(conn)?,
        SavedKind::Festival => festivals::table.find(id).count().get_result(conn)?,
    };
    if count == 0 {
        return Err(AppError::new(ErrorCode::ContentNotFound, format!("{kind:?} {id} not found")));
    }
    Ok(())
}

fn insert(conn: &mut PgConnection, kind: SavedKind, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    match kind {
        SavedKind::Place => diesel::insert_into(saved_places::table)
            .values(&NewSavedPlace { user_id, place_id: id })
            .on_conflict_do_nothing()
            .execute(conn)?,
        SavedKind::Food => diesel::insert_into(saved_foods::table)
            .values(&NewSavedFood { user_id, food_id: id })
            .on_conflict_do_nothing()
            .execute(conn)?,
        SavedKind::Festival => diesel::insert_into(saved_festivals::table)
            .values(&NewSavedFestival { user_id, festival_id: id })
            .on_conflict_do_nothing()
            .execute(conn)?,
    };
    Ok(())
}

fn remove(conn: &mut PgConnection, kind: SavedKind, user_id: Uuid, id: Uuid) -> Result<usize, AppError> {
    let removed = match kind {
        SavedKind::Place => diesel::delete(
            saved_places::table
                .filter(saved_places::user_id.eq(user_id))
                .filter(saved_places::place_id.eq(id)),
        )
        .execute(conn)?,
        SavedKind::Food => diesel::delete(
            saved_foods::table
                .filter(saved_foods::user_id.eq(user_id))
                .filter(saved_foods::food_id.eq(id)),
        )
        .execute(conn)?,
        SavedKind::Festival => diesel::delete(
            saved_festivals::table
                .filter(saved_festivals::user_id.eq(user_id))
                .filter(saved_festivals::festival_id.eq(id)),
        )
        .execute(conn)?,
    };
    Ok(removed)
}
