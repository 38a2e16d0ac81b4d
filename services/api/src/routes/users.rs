//! User and subscription endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use common::database::is_unique_violation;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    models::PageQuery,
    models::user::{
        CreateUserRequest, SubscriptionListResponse, SubscriptionResponse, User, UserListResponse,
        UserResponse,
    },
    repositories::UserStoreError,
    state::AppState,
    validation,
};

/// Query parameters for the subscriptions listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Cap on the number of recipes embedded per followed author
    pub recipe_limit: Option<i64>,
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_email(&payload.email).map_err(|m| ApiError::validation("email", m))?;
    validation::validate_username(&payload.username)
        .map_err(|m| ApiError::validation("username", m))?;
    validation::validate_password(&payload.password)
        .map_err(|m| ApiError::validation("password", m))?;

    let user = state
        .user_repository
        .create(&payload)
        .await
        .map_err(|e| match e {
            UserStoreError::DuplicateEmail => {
                ApiError::validation("email", "Email is already registered")
            }
            UserStoreError::DuplicateUsername => {
                ApiError::validation("username", "Username is already taken")
            }
            other => {
                tracing::error!("Failed to create user: {}", other);
                ApiError::InternalServerError
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(&user, false)),
    ))
}

/// Get users, paginated
pub async fn list_users(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthUser>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (users, total) = state
        .user_repository
        .list(query.limit() as i64, query.offset())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {}", e);
            ApiError::InternalServerError
        })?;

    let mut items = Vec::with_capacity(users.len());
    for user in &users {
        let is_subscribed = subscribed_flag(&state, viewer.as_deref(), user.id).await?;
        items.push(UserResponse::from_user(user, is_subscribed));
    }

    Ok(Json(UserListResponse {
        items,
        page: query.page(),
        limit: query.limit(),
        total,
    }))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    viewer: Option<Extension<AuthUser>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    let is_subscribed = subscribed_flag(&state, viewer.as_deref(), user.id).await?;

    Ok(Json(UserResponse::from_user(&user, is_subscribed)))
}

/// Get the authenticated user
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse::from_user(&user, false)))
}

/// Subscribe to an author
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if auth.id == id {
        return Err(ApiError::BadRequest(
            "You cannot subscribe to yourself".to_string(),
        ));
    }

    let target = state
        .user_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    state
        .subscription_repository
        .subscribe(auth.id, id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::BadRequest("Already subscribed to this user".to_string())
            } else {
                tracing::error!("Failed to subscribe: {}", e);
                ApiError::InternalServerError
            }
        })?;

    let response = subscription_response(&state, &target, None).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Unsubscribe from an author
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .subscription_repository
        .unsubscribe(auth.id, id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to unsubscribe: {}", e);
            ApiError::InternalServerError
        })?;

    // Deliberately 400 rather than 404 so clients treat toggle failures uniformly
    if removed == 0 {
        return Err(ApiError::BadRequest(
            "Not subscribed to this user".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Get the authors the authenticated user follows, with their recipes
pub async fn subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page_query = PageQuery {
        page: query.page,
        limit: query.limit,
    };

    let (authors, total) = state
        .subscription_repository
        .following(auth.id, page_query.limit() as i64, page_query.offset())
        .await
        .map_err(|e| {
            tracing::error!("Failed to list subscriptions: {}", e);
            ApiError::InternalServerError
        })?;

    let mut items = Vec::with_capacity(authors.len());
    for author in &authors {
        items.push(subscription_response(&state, author, query.recipe_limit).await?);
    }

    Ok(Json(SubscriptionListResponse {
        items,
        page: page_query.page(),
        limit: page_query.limit(),
        total,
    }))
}

/// Whether the viewer follows the given user; false for anonymous viewers
async fn subscribed_flag(
    state: &AppState,
    viewer: Option<&AuthUser>,
    user_id: Uuid,
) -> Result<bool, ApiError> {
    match viewer {
        Some(viewer) if viewer.id != user_id => state
            .subscription_repository
            .is_subscribed(viewer.id, user_id)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check subscription: {}", e);
                ApiError::InternalServerError
            }),
        _ => Ok(false),
    }
}

/// Assemble a followed author with their recipes and recipe count
async fn subscription_response(
    state: &AppState,
    author: &User,
    recipe_limit: Option<i64>,
) -> Result<SubscriptionResponse, ApiError> {
    let recipes = state
        .recipe_repository
        .short_for_author(author.id, recipe_limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load author recipes: {}", e);
            ApiError::InternalServerError
        })?;

    let recipes_count = state
        .recipe_repository
        .count_for_author(author.id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count author recipes: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(SubscriptionResponse {
        id: author.id,
        email: author.email.clone(),
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: true,
        recipes,
        recipes_count,
    })
}
