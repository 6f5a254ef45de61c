use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{
    districts, festivals, foods, places, reviews, saved_festivals, saved_foods, saved_places,
    tribes,
};

// --- Places ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = places)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub details: Option<String>,
    pub location: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize, Validate)]
#[diesel(table_name = places)]
pub struct NewPlace {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub details: Option<String>,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = places)]
pub struct PlacePatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub location: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

// --- Foods ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = foods)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub details: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize, Validate)]
#[diesel(table_name = foods)]
pub struct NewFood {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub details: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = foods)]
pub struct FoodPatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

// --- Festivals ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = festivals)]
pub struct Festival {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub details: Option<String>,
    pub date_info: Option<String>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize, Validate)]
#[diesel(table_name = festivals)]
pub struct NewFestival {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub details: Option<String>,
    pub date_info: Option<String>,
    pub location: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = festivals)]
pub struct FestivalPatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub details: Option<String>,
    pub date_info: Option<String>,
    pub location: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

// --- Tribes ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = tribes)]
pub struct Tribe {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub overview: Option<String>,
    pub communities: Option<String>,
    pub regions: Option<String>,
    pub belt_info: Option<String>,
    pub responsible_travel: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize, Validate)]
#[diesel(table_name = tribes)]
pub struct NewTribe {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub overview: Option<String>,
    pub communities: Option<String>,
    pub regions: Option<String>,
    pub belt_info: Option<String>,
    pub responsible_travel: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = tribes)]
pub struct TribePatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub overview: Option<String>,
    pub communities: Option<String>,
    pub regions: Option<String>,
    pub belt_info: Option<String>,
    pub responsible_travel: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

// --- Districts ---

#[derive(Debug, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = districts)]
pub struct District {
    pub id: Uuid,
    pub name: String,
    pub about: Option<String>,
    pub quick_facts: Option<String>,
    pub highlights: Vec<String>,
    pub tourist_places: Vec<String>,
    pub famous_foods: Vec<String>,
    pub famous_festivals: Vec<String>,
    pub getting_there: Option<String>,
    pub traveller_tips: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Deserialize, Validate)]
#[diesel(table_name = districts)]
pub struct NewDistrict {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub about: Option<String>,
    pub quick_facts: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub tourist_places: Vec<String>,
    #[serde(default)]
    pub famous_foods: Vec<String>,
    #[serde(default)]
    pub famous_festivals: Vec<String>,
    pub getting_there: Option<String>,
    #[serde(default)]
    pub traveller_tips: Vec<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, AsChangeset, Deserialize, Validate)]
#[diesel(table_name = districts)]
pub struct DistrictPatch {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    pub about: Option<String>,
    pub quick_facts: Option<String>,
    pub highlights: Option<Vec<String>>,
    pub tourist_places: Option<Vec<String>>,
    pub famous_foods: Option<Vec<String>>,
    pub famous_festivals: Option<Vec<String>>,
    pub getting_there: Option<String>,
    pub traveller_tips: Option<Vec<String>>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

// --- Saved items ---

#[derive(Debug, Insertable)]
#[diesel(table_name = saved_places)]
pub struct NewSavedPlace {
    pub user_id: Uuid,
    pub place_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = saved_foods)]
pub struct NewSavedFood {
    pub user_id: Uuid,
    pub food_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = saved_festivals)]
pub struct NewSavedFestival {
    pub user_id: Uuid,
    pub festival_id: Uuid,
}

// --- Site reviews ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reviews)]
pub struct NewReview {
    pub user_name: String,
    pub rating: i32,
    pub review_text: String,
}
