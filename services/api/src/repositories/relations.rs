//! Favorite and shopping-cart join-row repositories
//!
//! Both tables are pure (user, recipe) join rows driven by toggle
//! endpoints. Duplicate adds are rejected by the unique constraint rather
//! than application-level locking; callers classify the resulting error.

use sqlx::PgPool;
use uuid::Uuid;

use crate::shopping_list::CartLine;

/// Favorite repository for database operations
#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    /// Create a new favorite repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a favorite row
    pub async fn add(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a favorite row; returns the number of rows removed
    pub async fn remove(&self, user_id: Uuid, recipe_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND recipe_id = $2
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Shopping-cart repository for database operations
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a cart entry
    pub async fn add(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO shopping_cart_entries (user_id, recipe_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a cart entry; returns the number of rows removed
    pub async fn remove(&self, user_id: Uuid, recipe_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM shopping_cart_entries
            WHERE user_id = $1 AND recipe_id = $2
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Every (ingredient, amount) row reachable through the user's cart
    pub async fn lines(&self, user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            r#"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM shopping_cart_entries sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    use common::database::{DatabaseConfig, init_pool, is_unique_violation};

    use crate::models::recipe::{IngredientAmount, RecipeWriteRequest};
    use crate::models::user::CreateUserRequest;
    use crate::repositories::UserRepository;
    use crate::repositories::recipe::RecipeRepository;

    async fn test_pool() -> PgPool {
        let config = DatabaseConfig::from_env().expect("database config");
        init_pool(&config).await.expect("database pool")
    }

    async fn create_user(pool: &PgPool) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        let user = UserRepository::new(pool.clone())
            .create(&CreateUserRequest {
                email: format!("cook-{suffix}@example.com"),
                username: format!("cook_{suffix}"),
                first_name: "Test".to_string(),
                last_name: "Cook".to_string(),
                password: "Passw0rd!".to_string(),
            })
            .await
            .expect("test user");
        user.id
    }

    async fn create_recipe(pool: &PgPool, author: Uuid) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();

        let tag_id: Uuid =
            sqlx::query_scalar("INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id")
                .bind(format!("tag-{suffix}"))
                .bind(format!("tag-{suffix}"))
                .fetch_one(pool)
                .await
                .expect("test tag");

        let ingredient_id: Uuid = sqlx::query_scalar(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, 'g') RETURNING id",
        )
        .bind(format!("flour-{suffix}"))
        .fetch_one(pool)
        .await
        .expect("test ingredient");

        RecipeRepository::new(pool.clone())
            .create(
                author,
                &RecipeWriteRequest {
                    name: format!("Bread {suffix}"),
                    text: "Mix and bake".to_string(),
                    image: "bread.png".to_string(),
                    cooking_time: 60,
                    tags: vec![tag_id],
                    ingredients: vec![IngredientAmount {
                        id: ingredient_id,
                        amount: 100,
                    }],
                },
            )
            .await
            .expect("test recipe")
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres"]
    async fn test_duplicate_favorite_rejected_by_unique_constraint() {
        let pool = test_pool().await;
        let user = create_user(&pool).await;
        let recipe = create_recipe(&pool, user).await;
        let repo = FavoriteRepository::new(pool.clone());

        repo.add(user, recipe).await.expect("first add");

        let err = repo.add(user, recipe).await.expect_err("duplicate add");
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres"]
    async fn test_removing_missing_favorite_affects_no_rows() {
        let pool = test_pool().await;
        let user = create_user(&pool).await;
        let recipe = create_recipe(&pool, user).await;
        let repo = FavoriteRepository::new(pool.clone());

        assert_eq!(repo.remove(user, recipe).await.expect("remove"), 0);

        repo.add(user, recipe).await.expect("add");
        assert_eq!(repo.remove(user, recipe).await.expect("remove"), 1);
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres"]
    async fn test_cart_toggle_round_trip() {
        let pool = test_pool().await;
        let user = create_user(&pool).await;
        let recipe = create_recipe(&pool, user).await;
        let repo = CartRepository::new(pool.clone());

        assert_eq!(repo.remove(user, recipe).await.expect("remove"), 0);

        repo.add(user, recipe).await.expect("add");
        let err = repo.add(user, recipe).await.expect_err("duplicate add");
        assert!(is_unique_violation(&err));

        let lines = repo.lines(user).await.expect("lines");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount, 100);

        assert_eq!(repo.remove(user, recipe).await.expect("remove"), 1);
        assert!(repo.lines(user).await.expect("lines").is_empty());
    }
}
