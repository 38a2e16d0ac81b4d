//! Tag and ingredient read-only endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::ApiError, models::catalog::IngredientQuery, state::AppState};

/// Get all tags
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tags = state.tag_repository.list().await.map_err(|e| {
        tracing::error!("Failed to list tags: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(tags))
}

/// Get a tag by ID
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state
        .tag_repository
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get tag: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag))
}

/// Get ingredients, optionally filtered by name prefix
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredients = state
        .ingredient_repository
        .list(query.name.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list ingredients: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(ingredients))
}

/// Get an ingredient by ID
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = state
        .ingredient_repository
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get ingredient: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Ingredient not found".to_string()))?;

    Ok(Json(ingredient))
}
