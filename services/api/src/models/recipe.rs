//! Recipe models for request and response payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{catalog::Tag, user::UserResponse};

/// Recipe entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub author_id: Uuid,
    pub text: String,
    /// Opaque image URL or path; upload handling lives elsewhere
    pub image: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// One (ingredient, amount) pair in a recipe write payload
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmount {
    pub id: Uuid,
    pub amount: i32,
}

/// Request body for recipe create and update
///
/// Updates replace the full tag set and the full ingredient set; partial
/// updates of either list are not supported.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeWriteRequest {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Ingredient line inside a recipe response
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeIngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full recipe representation
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<Tag>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Short recipe representation used by toggle responses and subscriptions
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeShortResponse {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// Query parameters for recipe listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Filter by author id
    pub author: Option<Uuid>,
    /// Filter by tag slug; repeatable
    #[serde(default)]
    pub tags: Vec<String>,
    /// Only recipes the viewer favorited (1 = on); ignored for anonymous viewers
    pub is_favorited: Option<u8>,
    /// Only recipes in the viewer's shopping cart (1 = on); ignored for anonymous viewers
    pub is_in_shopping_cart: Option<u8>,
}

impl RecipeQuery {
    /// Effective page number, clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to [1, MAX_PAGE_SIZE]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(crate::models::DEFAULT_PAGE_SIZE)
            .clamp(1, crate::models::MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page
    pub fn offset(&self) -> i64 {
        (self.page() - 1) as i64 * self.limit() as i64
    }
}

/// Response for paginated recipe listing
#[derive(Debug, Clone, Serialize)]
pub struct RecipeListResponse {
    pub items: Vec<RecipeResponse>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}
