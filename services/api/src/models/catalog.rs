//! Tag and ingredient catalog models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Recipe tag
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    /// Hex color, e.g. "#FF0000"
    pub color: String,
    pub slug: String,
}

/// Ingredient from the catalog; (name, measurement_unit) is unique
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

/// Query parameters for ingredient listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientQuery {
    /// Case-insensitive name prefix filter
    pub name: Option<String>,
}
