//! Catalog seeding utility
//!
//! Loads tags and ingredients from JSON files into the database so a fresh
//! deployment has a catalog to build recipes from. Rows that already exist
//! are left untouched, so reruns are safe.
//!
//! File locations default to `data/tags.json` and `data/ingredients.json`
//! and can be overridden with the `TAGS_FILE` and `INGREDIENTS_FILE`
//! environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool};

#[derive(Debug, Deserialize)]
struct TagSeed {
    name: String,
    color: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct IngredientSeed {
    name: String,
    measurement_unit: String,
}

fn load_seed_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse seed file {}", path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let tags_path = std::env::var("TAGS_FILE").unwrap_or_else(|_| "data/tags.json".to_string());
    let ingredients_path =
        std::env::var("INGREDIENTS_FILE").unwrap_or_else(|_| "data/ingredients.json".to_string());

    let tags: Vec<TagSeed> = load_seed_file(&tags_path)?;
    let ingredients: Vec<IngredientSeed> = load_seed_file(&ingredients_path)?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    let names: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();
    let colors: Vec<String> = tags.iter().map(|t| t.color.clone()).collect();
    let slugs: Vec<String> = tags.iter().map(|t| t.slug.clone()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO tags (name, color, slug)
        SELECT name, color, slug
        FROM UNNEST($1::text[], $2::text[], $3::text[]) AS t(name, color, slug)
        ON CONFLICT ON CONSTRAINT unique_tag_slug DO NOTHING
        "#,
    )
    .bind(&names)
    .bind(&colors)
    .bind(&slugs)
    .execute(&pool)
    .await?;

    info!(
        "Seeded {} of {} tags from {}",
        result.rows_affected(),
        tags.len(),
        tags_path
    );

    let names: Vec<String> = ingredients.iter().map(|i| i.name.clone()).collect();
    let units: Vec<String> = ingredients.iter().map(|i| i.measurement_unit.clone()).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO ingredients (name, measurement_unit)
        SELECT name, unit
        FROM UNNEST($1::text[], $2::text[]) AS t(name, unit)
        ON CONFLICT ON CONSTRAINT unique_ingredient DO NOTHING
        "#,
    )
    .bind(&names)
    .bind(&units)
    .execute(&pool)
    .await?;

    info!(
        "Seeded {} of {} ingredients from {}",
        result.rows_affected(),
        ingredients.len(),
        ingredients_path
    );

    Ok(())
}
