//! Tag and ingredient catalog repositories

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::catalog::{Ingredient, Tag};

/// Tag repository for database operations
#[derive(Clone)]
pub struct TagRepository {
    pool: PgPool,
}

impl TagRepository {
    /// Create a new tag repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get all tags ordered by name
    pub async fn list(&self) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, color, slug
            FROM tags
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Get a tag by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, name, color, slug
            FROM tags
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Ingredient repository for database operations
#[derive(Clone)]
pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    /// Create a new ingredient repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get ingredients ordered by name, optionally filtered by name prefix
    pub async fn list(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>, sqlx::Error> {
        match name_prefix {
            Some(prefix) => {
                // Escape LIKE metacharacters so the filter stays a prefix match
                let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE name ILIKE $1 || '%'
                    ORDER BY name
                    "#,
                )
                .bind(escaped)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Ingredient>(
                    r#"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    ORDER BY name
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// Get an ingredient by ID
    pub async fn get(&self, id: Uuid) -> Result<Option<Ingredient>, sqlx::Error> {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
