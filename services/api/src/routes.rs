//! API service routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;

use crate::{
    middleware::{auth_middleware, viewer_middleware},
    state::AppState,
};

pub mod auth;
pub mod catalog;
pub mod recipes;
pub mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    // Mutating routes and user-scoped reads require a valid access token
    let protected = Router::new()
        .route("/users/me", get(users::me))
        .route("/users/subscriptions", get(users::subscriptions))
        .route(
            "/users/:id/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .route("/recipes", post(recipes::create_recipe))
        .route(
            "/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/recipes/:id",
            patch(recipes::update_recipe).delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/:id/favorite",
            post(recipes::favorite).delete(recipes::unfavorite),
        )
        .route(
            "/recipes/:id/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Public reads; viewer identity is picked up when a token is present so
    // responses can carry viewer-scoped flags
    let readable = Router::new()
        .route("/recipes", get(recipes::list_recipes))
        .route("/recipes/:id", get(recipes::get_recipe))
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            viewer_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(users::create_user))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
        .route("/tags", get(catalog::list_tags))
        .route("/tags/:id", get(catalog::get_tag))
        .route("/ingredients", get(catalog::list_ingredients))
        .route("/ingredients/:id", get(catalog::get_ingredient))
        .merge(protected)
        .merge(readable)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
