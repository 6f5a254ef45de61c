use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use odisha_shared::errors::{AppError, AppResult, ErrorCode};
use odisha_shared::types::auth::AuthUser;
use odisha_shared::types::{ApiResponse, Paginated, PaginationParams};

use crate::models::{NewReview, Review};
use crate::schema::reviews;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub review_text: String,
    pub user_name: String,
}

impl CreateReviewRequest {
    fn into_new_review(self) -> Result<NewReview, AppError> {
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::new(ErrorCode::InvalidRating, "rating must be between 1 and 5"));
        }
        let review_text = self.review_text.trim().to_string();
        if review_text.is_empty() {
            return Err(AppError::new(ErrorCode::ValidationError, "review text is required"));
        }
        let user_name = self.user_name.trim().to_string();
        if user_name.is_empty() {
            return Err(AppError::new(ErrorCode::ValidationError, "user name is required"));
        }
        Ok(NewReview { user_name, rating: self.rating, review_text })
    }
}

// --- POST /reviews ---

pub async fn create_review(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let new_review = req.into_new_review()?;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let review: Review = diesel::insert_into(reviews::table)
        .values(&new_review)
        .get_result(&mut conn)?;

    tracing::info!(user_id = %user.id, review_id = %review.id, rating = review.rating, "site review posted");

    Ok(Json(ApiResponse::ok(review)))
}

// --- GET /reviews ---

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Review>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = reviews::table.count().get_result(&mut conn)?;
    let items = reviews::table
        .order(reviews::created_at.desc())
        .offset(params.offset() as i64)
        .limit(params.limit() as i64)
        .load::<Review>(&mut conn)?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}
