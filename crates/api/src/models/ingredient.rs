//! Ingredient reference data.

use pantry_core::IngredientId;
use serde::Serialize;

/// An entry of the ingredient catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}
