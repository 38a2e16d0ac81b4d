//! Recipe repository for database operations
//!
//! The write path treats a recipe and its tag links and ingredient rows as
//! one unit: create and update run in a single transaction, and updates
//! replace both sets wholesale.

use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

use common::database::violated_constraint;

use crate::models::recipe::{
    Recipe, RecipeIngredientResponse, RecipeQuery, RecipeShortResponse, RecipeWriteRequest,
    IngredientAmount,
};
use crate::models::catalog::Tag;

/// Error type for recipe persistence
#[derive(Debug, Error)]
pub enum RecipeWriteError {
    #[error("Unknown tag id in payload")]
    UnknownTag,

    #[error("Unknown ingredient id in payload")]
    UnknownIngredient,

    #[error("You already have a recipe with this name")]
    DuplicateName,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Recipe repository for database operations
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a recipe with its tag links and ingredient rows in one transaction
    pub async fn create(
        &self,
        author_id: Uuid,
        payload: &RecipeWriteRequest,
    ) -> Result<Uuid, RecipeWriteError> {
        let mut tx = self.pool.begin().await?;

        check_references(&mut tx, &payload.tags, &payload.ingredients).await?;

        let recipe_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO recipes (name, author_id, text, image, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&payload.name)
        .bind(author_id)
        .bind(&payload.text)
        .bind(&payload.image)
        .bind(payload.cooking_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_recipe_error)?;

        insert_links(&mut tx, recipe_id, payload).await?;

        tx.commit().await?;
        Ok(recipe_id)
    }

    /// Update a recipe, replacing the full tag set and the full ingredient set
    pub async fn update(
        &self,
        recipe_id: Uuid,
        payload: &RecipeWriteRequest,
    ) -> Result<(), RecipeWriteError> {
        let mut tx = self.pool.begin().await?;

        check_references(&mut tx, &payload.tags, &payload.ingredients).await?;

        sqlx::query(
            r#"
            UPDATE recipes
            SET name = $1, text = $2, image = $3, cooking_time = $4
            WHERE id = $5
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.text)
        .bind(&payload.image)
        .bind(payload.cooking_time)
        .bind(recipe_id)
        .execute(&mut *tx)
        .await
        .map_err(classify_recipe_error)?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;

        insert_links(&mut tx, recipe_id, payload).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a recipe; dependent rows cascade. Returns rows removed.
    pub async fn delete(&self, recipe_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Get a recipe by ID
    pub async fn get(&self, recipe_id: Uuid) -> Result<Option<Recipe>, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, author_id, text, image, cooking_time, pub_date
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Check whether a recipe exists
    pub async fn exists(&self, recipe_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(recipe_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Get recipes with pagination and filtering, newest first
    pub async fn list(
        &self,
        query: &RecipeQuery,
        viewer: Option<Uuid>,
    ) -> Result<(Vec<Recipe>, i64), sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT r.id, r.name, r.author_id, r.text, r.image, r.cooking_time, r.pub_date \
             FROM recipes r WHERE TRUE",
        );
        push_filters(&mut builder, query, viewer);
        builder
            .push(" ORDER BY r.pub_date DESC LIMIT ")
            .push_bind(query.limit() as i64)
            .push(" OFFSET ")
            .push_bind(query.offset());

        let recipes = builder
            .build_query_as::<Recipe>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
        push_filters(&mut count_builder, query, viewer);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((recipes, total))
    }

    /// Tags linked to a recipe, ordered by name
    pub async fn tags_for(&self, recipe_id: Uuid) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.color, t.slug
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Ingredient lines of a recipe, ordered by ingredient name
    pub async fn ingredients_for(
        &self,
        recipe_id: Uuid,
    ) -> Result<Vec<RecipeIngredientResponse>, sqlx::Error> {
        sqlx::query_as::<_, RecipeIngredientResponse>(
            r#"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Viewer-scoped (is_favorited, is_in_shopping_cart) flags for a recipe
    pub async fn flags_for(
        &self,
        recipe_id: Uuid,
        user_id: Uuid,
    ) -> Result<(bool, bool), sqlx::Error> {
        sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM favorites
                        WHERE user_id = $2 AND recipe_id = $1),
                EXISTS (SELECT 1 FROM shopping_cart_entries
                        WHERE user_id = $2 AND recipe_id = $1)
            "#,
        )
        .bind(recipe_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Short recipe rows for an author, newest first, optionally limited
    pub async fn short_for_author(
        &self,
        author_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<RecipeShortResponse>, sqlx::Error> {
        sqlx::query_as::<_, RecipeShortResponse>(
            r#"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY pub_date DESC
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Number of recipes published by an author
    pub async fn count_for_author(&self, author_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
    }
}

/// Verify every referenced tag and ingredient id exists
async fn check_references(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    tags: &[Uuid],
    ingredients: &[IngredientAmount],
) -> Result<(), RecipeWriteError> {
    let tag_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE id = ANY($1)")
        .bind(tags)
        .fetch_one(&mut **tx)
        .await?;
    if tag_count != tags.len() as i64 {
        return Err(RecipeWriteError::UnknownTag);
    }

    let ingredient_ids: Vec<Uuid> = ingredients.iter().map(|i| i.id).collect();
    let ingredient_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM ingredients WHERE id = ANY($1)")
            .bind(&ingredient_ids)
            .fetch_one(&mut **tx)
            .await?;
    if ingredient_count != ingredient_ids.len() as i64 {
        return Err(RecipeWriteError::UnknownIngredient);
    }

    Ok(())
}

/// Bulk-insert the tag links and ingredient rows for a recipe
async fn insert_links(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    recipe_id: Uuid,
    payload: &RecipeWriteRequest,
) -> Result<(), RecipeWriteError> {
    sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, tag_id FROM UNNEST($2::uuid[]) AS t(tag_id)
        "#,
    )
    .bind(recipe_id)
    .bind(&payload.tags)
    .execute(&mut **tx)
    .await?;

    let ingredient_ids: Vec<Uuid> = payload.ingredients.iter().map(|i| i.id).collect();
    let amounts: Vec<i32> = payload.ingredients.iter().map(|i| i.amount).collect();

    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, ingredient_id, amount
        FROM UNNEST($2::uuid[], $3::int[]) AS t(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(&ingredient_ids)
    .bind(&amounts)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Map the (name, author) unique violation to a domain error
fn classify_recipe_error(err: sqlx::Error) -> RecipeWriteError {
    match violated_constraint(&err).as_deref() {
        Some("unique_recipe_per_author") => RecipeWriteError::DuplicateName,
        _ => RecipeWriteError::Db(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    use common::database::{DatabaseConfig, init_pool};

    use crate::models::user::CreateUserRequest;
    use crate::repositories::UserRepository;

    async fn test_pool() -> PgPool {
        let config = DatabaseConfig::from_env().expect("database config");
        init_pool(&config).await.expect("database pool")
    }

    async fn create_author(pool: &PgPool) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        let user = UserRepository::new(pool.clone())
            .create(&CreateUserRequest {
                email: format!("author-{suffix}@example.com"),
                username: format!("author_{suffix}"),
                first_name: "Test".to_string(),
                last_name: "Author".to_string(),
                password: "Passw0rd!".to_string(),
            })
            .await
            .expect("test author");
        user.id
    }

    async fn create_ingredient(pool: &PgPool, name_prefix: &str) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        sqlx::query_scalar(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, 'g') RETURNING id",
        )
        .bind(format!("{name_prefix}-{suffix}"))
        .fetch_one(pool)
        .await
        .expect("test ingredient")
    }

    async fn create_tag(pool: &PgPool) -> Uuid {
        let suffix = Uuid::new_v4().simple().to_string();
        sqlx::query_scalar("INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id")
            .bind(format!("tag-{suffix}"))
            .bind(format!("tag-{suffix}"))
            .fetch_one(pool)
            .await
            .expect("test tag")
    }

    fn write_request(name: &str, tags: Vec<Uuid>, ingredients: Vec<(Uuid, i32)>) -> RecipeWriteRequest {
        RecipeWriteRequest {
            name: name.to_string(),
            text: "Mix and bake".to_string(),
            image: "dish.png".to_string(),
            cooking_time: 45,
            tags,
            ingredients: ingredients
                .into_iter()
                .map(|(id, amount)| IngredientAmount { id, amount })
                .collect(),
        }
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres"]
    async fn test_update_replaces_ingredient_set_without_stale_rows() {
        let pool = test_pool().await;
        let author = create_author(&pool).await;
        let tag = create_tag(&pool).await;
        let flour = create_ingredient(&pool, "flour").await;
        let sugar = create_ingredient(&pool, "sugar").await;
        let repo = RecipeRepository::new(pool.clone());

        let suffix = Uuid::new_v4().simple().to_string();
        let recipe_id = repo
            .create(
                author,
                &write_request(
                    &format!("Cake {suffix}"),
                    vec![tag],
                    vec![(flour, 100), (sugar, 200)],
                ),
            )
            .await
            .expect("create");

        repo.update(
            recipe_id,
            &write_request(&format!("Cake {suffix}"), vec![tag], vec![(sugar, 50)]),
        )
        .await
        .expect("update");

        let rows = repo.ingredients_for(recipe_id).await.expect("ingredients");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, sugar);
        assert_eq!(rows[0].amount, 50);
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires a running Postgres"]
    async fn test_create_rejects_unknown_ingredient() {
        let pool = test_pool().await;
        let author = create_author(&pool).await;
        let tag = create_tag(&pool).await;
        let repo = RecipeRepository::new(pool.clone());

        let suffix = Uuid::new_v4().simple().to_string();
        let err = repo
            .create(
                author,
                &write_request(
                    &format!("Ghost {suffix}"),
                    vec![tag],
                    vec![(Uuid::new_v4(), 10)],
                ),
            )
            .await
            .expect_err("unknown ingredient");

        assert!(matches!(err, RecipeWriteError::UnknownIngredient));
    }
}

/// Append the optional listing filters to a recipe query
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &RecipeQuery, viewer: Option<Uuid>) {
    if let Some(author) = query.author {
        builder.push(" AND r.author_id = ").push_bind(author);
    }

    if !query.tags.is_empty() {
        builder
            .push(
                " AND r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
                 JOIN tags t ON t.id = rt.tag_id WHERE t.slug = ANY(",
            )
            .push_bind(query.tags.clone())
            .push("))");
    }

    // Viewer-scoped filters are ignored for anonymous viewers
    if let Some(viewer) = viewer {
        if query.is_favorited.unwrap_or(0) != 0 {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM favorites f \
                     WHERE f.recipe_id = r.id AND f.user_id = ",
                )
                .push_bind(viewer)
                .push(")");
        }

        if query.is_in_shopping_cart.unwrap_or(0) != 0 {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM shopping_cart_entries sc \
                     WHERE sc.recipe_id = r.id AND sc.user_id = ",
                )
                .push_bind(viewer)
                .push(")");
        }
    }
}
