//! Application state shared across handlers

use common::cache::RedisPool;
use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::repositories::{
    SubscriptionRepository, UserRepository,
    catalog::{IngredientRepository, TagRepository},
    recipe::RecipeRepository,
    relations::{CartRepository, FavoriteRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub subscription_repository: SubscriptionRepository,
    pub tag_repository: TagRepository,
    pub ingredient_repository: IngredientRepository,
    pub recipe_repository: RecipeRepository,
    pub favorite_repository: FavoriteRepository,
    pub cart_repository: CartRepository,
}

impl AppState {
    /// Build the full state from shared pools and a JWT service
    pub fn new(db_pool: PgPool, redis_pool: RedisPool, jwt_service: JwtService) -> Self {
        AppState {
            user_repository: UserRepository::new(db_pool.clone()),
            subscription_repository: SubscriptionRepository::new(db_pool.clone()),
            tag_repository: TagRepository::new(db_pool.clone()),
            ingredient_repository: IngredientRepository::new(db_pool.clone()),
            recipe_repository: RecipeRepository::new(db_pool.clone()),
            favorite_repository: FavoriteRepository::new(db_pool.clone()),
            cart_repository: CartRepository::new(db_pool.clone()),
            db_pool,
            redis_pool,
            jwt_service,
        }
    }
}
