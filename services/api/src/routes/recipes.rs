//! Recipe endpoints: CRUD, favorite/cart toggles, shopping-list export

use axum::{
    Extension, Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use uuid::Uuid;

use common::database::is_unique_violation;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    models::recipe::{
        Recipe, RecipeListResponse, RecipeQuery, RecipeResponse, RecipeShortResponse,
        RecipeWriteRequest,
    },
    models::user::UserResponse,
    repositories::recipe::RecipeWriteError,
    shopping_list::{self, SHOPPING_LIST_FILENAME},
    state::AppState,
    validation,
};

/// Get recipes with pagination and filtering, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthUser>>,
    Query(query): Query<RecipeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let viewer_id = viewer.as_deref().map(|v| v.id);

    let (recipes, total) = state
        .recipe_repository
        .list(&query, viewer_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list recipes: {}", e);
            ApiError::InternalServerError
        })?;

    let mut items = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        items.push(build_recipe_response(&state, recipe, viewer_id).await?);
    }

    Ok(Json(RecipeListResponse {
        items,
        page: query.page(),
        limit: query.limit(),
        total,
    }))
}

/// Get a recipe by ID
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthUser>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = fetch_recipe(&state, id).await?;
    let viewer_id = viewer.as_deref().map(|v| v.id);

    Ok(Json(build_recipe_response(&state, recipe, viewer_id).await?))
}

/// Create a recipe with its tags and ingredients
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_write_payload(&payload)?;

    let recipe_id = state
        .recipe_repository
        .create(auth.id, &payload)
        .await
        .map_err(map_write_error)?;

    let recipe = fetch_recipe(&state, recipe_id).await?;
    let response = build_recipe_response(&state, recipe, Some(auth.id)).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Update a recipe, replacing its full tag and ingredient sets
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = fetch_recipe(&state, id).await?;
    if recipe.author_id != auth.id {
        return Err(ApiError::Forbidden(
            "Only the author can edit a recipe".to_string(),
        ));
    }

    validate_write_payload(&payload)?;

    state
        .recipe_repository
        .update(id, &payload)
        .await
        .map_err(map_write_error)?;

    let recipe = fetch_recipe(&state, id).await?;
    let response = build_recipe_response(&state, recipe, Some(auth.id)).await?;

    Ok(Json(response))
}

/// Delete a recipe; dependent rows cascade
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = fetch_recipe(&state, id).await?;
    if recipe.author_id != auth.id {
        return Err(ApiError::Forbidden(
            "Only the author can delete a recipe".to_string(),
        ));
    }

    state.recipe_repository.delete(id).await.map_err(|e| {
        tracing::error!("Failed to delete recipe: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the authenticated user's favorites
pub async fn favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = fetch_recipe(&state, id).await?;

    state
        .favorite_repository
        .add(auth.id, id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::BadRequest("Recipe is already in favorites".to_string())
            } else {
                tracing::error!("Failed to add favorite: {}", e);
                ApiError::InternalServerError
            }
        })?;

    Ok((StatusCode::CREATED, Json(short_response(&recipe))))
}

/// Remove a recipe from the authenticated user's favorites
pub async fn unfavorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .favorite_repository
        .remove(auth.id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove favorite: {}", e);
            ApiError::InternalServerError
        })?;

    // Deliberately 400 rather than 404 so clients treat toggle failures uniformly
    if removed == 0 {
        return Err(ApiError::BadRequest(
            "Recipe is not in favorites".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Add a recipe to the authenticated user's shopping cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe = fetch_recipe(&state, id).await?;

    state.cart_repository.add(auth.id, id).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::BadRequest("Recipe is already in the shopping cart".to_string())
        } else {
            tracing::error!("Failed to add cart entry: {}", e);
            ApiError::InternalServerError
        }
    })?;

    Ok((StatusCode::CREATED, Json(short_response(&recipe))))
}

/// Remove a recipe from the authenticated user's shopping cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .cart_repository
        .remove(auth.id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to remove cart entry: {}", e);
            ApiError::InternalServerError
        })?;

    if removed == 0 {
        return Err(ApiError::BadRequest(
            "Recipe is not in the shopping cart".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Download the aggregated shopping list as a plain-text attachment
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response, ApiError> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    let lines = state.cart_repository.lines(auth.id).await.map_err(|e| {
        tracing::error!("Failed to load cart lines: {}", e);
        ApiError::InternalServerError
    })?;

    let items = shopping_list::aggregate(lines);
    let document = shopping_list::render(&user.first_name, &items);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", SHOPPING_LIST_FILENAME),
        )
        .body(Body::from(document))
        .map_err(|e| {
            tracing::error!("Failed to build export response: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(response)
}

/// Fetch a recipe or map its absence to a 404
async fn fetch_recipe(state: &AppState, id: Uuid) -> Result<Recipe, ApiError> {
    state
        .recipe_repository
        .get(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get recipe: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Recipe not found".to_string()))
}

/// Run the write-payload validation rules
fn validate_write_payload(payload: &RecipeWriteRequest) -> Result<(), ApiError> {
    validation::validate_recipe_name(&payload.name).map_err(|m| ApiError::validation("name", m))?;
    validation::validate_cooking_time(payload.cooking_time)
        .map_err(|m| ApiError::validation("cooking_time", m))?;
    validation::validate_tag_ids(&payload.tags).map_err(|m| ApiError::validation("tags", m))?;
    validation::validate_ingredient_amounts(&payload.ingredients)
        .map_err(|m| ApiError::validation("ingredients", m))?;

    Ok(())
}

/// Map recipe persistence errors to API errors
fn map_write_error(err: RecipeWriteError) -> ApiError {
    match err {
        RecipeWriteError::UnknownTag => ApiError::validation("tags", "Unknown tag id"),
        RecipeWriteError::UnknownIngredient => {
            ApiError::validation("ingredients", "Unknown ingredient id")
        }
        RecipeWriteError::DuplicateName => {
            ApiError::validation("name", "You already have a recipe with this name")
        }
        RecipeWriteError::Db(e) => {
            tracing::error!("Failed to persist recipe: {}", e);
            ApiError::InternalServerError
        }
    }
}

/// Short representation used by toggle responses
fn short_response(recipe: &Recipe) -> RecipeShortResponse {
    RecipeShortResponse {
        id: recipe.id,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        cooking_time: recipe.cooking_time,
    }
}

/// Assemble the full recipe representation for a viewer
async fn build_recipe_response(
    state: &AppState,
    recipe: Recipe,
    viewer: Option<Uuid>,
) -> Result<RecipeResponse, ApiError> {
    let author = state
        .user_repository
        .find_by_id(recipe.author_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get recipe author: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::InternalServerError)?;

    let is_subscribed = match viewer {
        Some(viewer_id) if viewer_id != author.id => state
            .subscription_repository
            .is_subscribed(viewer_id, author.id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check subscription: {}", e);
                ApiError::InternalServerError
            })?,
        _ => false,
    };

    let tags = state
        .recipe_repository
        .tags_for(recipe.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load recipe tags: {}", e);
            ApiError::InternalServerError
        })?;

    let ingredients = state
        .recipe_repository
        .ingredients_for(recipe.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load recipe ingredients: {}", e);
            ApiError::InternalServerError
        })?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => state
            .recipe_repository
            .flags_for(recipe.id, viewer_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load recipe flags: {}", e);
                ApiError::InternalServerError
            })?,
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: recipe.id,
        tags,
        author: UserResponse::from_user(&author, is_subscribed),
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}
