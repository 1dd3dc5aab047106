//! Recipe publishing: validation, ownership checks and persistence.

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use pantry_core::{Amount, CookingTime, IngredientId, RecipeId, RecipeImage, UserId};

use crate::db::{IngredientRepository, RecipeRepository, RepositoryError};
use crate::models::{NewRecipe, Recipe, RecipeLine, RecipePatch};

/// Longest accepted recipe name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Errors that can occur while publishing or editing recipes.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Submitted data failed validation.
    #[error("{0}")]
    Validation(String),

    /// Recipe does not exist.
    #[error("recipe not found")]
    NotFound,

    /// Caller is not the recipe's author.
    #[error("only the author can change this recipe")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

// =============================================================================
// Request Types
// =============================================================================

/// One ingredient line as submitted by clients.
#[derive(Debug, Clone, Deserialize)]
pub struct LineForm {
    pub id: IngredientId,
    pub amount: i64,
}

/// Body of `POST /api/recipes`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeForm {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: String,
    pub ingredients: Vec<LineForm>,
}

/// Body of `PATCH /api/recipes/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatchForm {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<LineForm>>,
}

impl RecipeForm {
    /// Validate every field without touching the database.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` naming the first offending field.
    pub fn validate(self) -> Result<NewRecipe, RecipeError> {
        Ok(NewRecipe {
            name: validate_name(&self.name)?,
            text: validate_text(&self.text)?,
            cooking_time: validate_cooking_time(self.cooking_time)?,
            image: validate_image(&self.image)?,
            ingredients: validate_lines(&self.ingredients)?,
        })
    }
}

impl RecipePatchForm {
    /// Validate the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` naming the first offending field.
    pub fn validate(self) -> Result<RecipePatch, RecipeError> {
        Ok(RecipePatch {
            name: self.name.as_deref().map(validate_name).transpose()?,
            text: self.text.as_deref().map(validate_text).transpose()?,
            cooking_time: self.cooking_time.map(validate_cooking_time).transpose()?,
            image: self.image.as_deref().map(validate_image).transpose()?,
            ingredients: self
                .ingredients
                .as_deref()
                .map(validate_lines)
                .transpose()?,
        })
    }
}

fn validate_name(name: &str) -> Result<String, RecipeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecipeError::Validation("name: must not be empty".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RecipeError::Validation(format!(
            "name: must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}

fn validate_text(text: &str) -> Result<String, RecipeError> {
    if text.trim().is_empty() {
        return Err(RecipeError::Validation("text: must not be empty".to_owned()));
    }
    Ok(text.to_owned())
}

fn validate_cooking_time(minutes: i64) -> Result<CookingTime, RecipeError> {
    CookingTime::new(minutes).map_err(|e| RecipeError::Validation(format!("cooking_time: {e}")))
}

fn validate_image(image: &str) -> Result<RecipeImage, RecipeError> {
    RecipeImage::parse(image).map_err(|e| RecipeError::Validation(format!("image: {e}")))
}

fn validate_lines(lines: &[LineForm]) -> Result<Vec<RecipeLine>, RecipeError> {
    if lines.is_empty() {
        return Err(RecipeError::Validation(
            "ingredients: at least one ingredient is required".to_owned(),
        ));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    lines
        .iter()
        .map(|line| {
            if !seen.insert(line.id) {
                return Err(RecipeError::Validation(format!(
                    "ingredients: ingredient {} is listed more than once",
                    line.id
                )));
            }
            let amount = Amount::new(line.amount).map_err(|e| {
                RecipeError::Validation(format!("ingredients: amount of ingredient {}: {e}", line.id))
            })?;
            Ok(RecipeLine {
                ingredient_id: line.id,
                amount,
            })
        })
        .collect()
}

// =============================================================================
// Service
// =============================================================================

/// Recipe write operations.
pub struct RecipeService<'a> {
    pool: &'a PgPool,
}

impl<'a> RecipeService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Publish a recipe on behalf of `author`.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::Validation` for invalid input or unknown ingredients.
    /// Returns `RecipeError::Repository` if the database fails.
    #[tracing::instrument(skip_all, fields(author = %author))]
    pub async fn create(&self, author: UserId, form: RecipeForm) -> Result<Recipe, RecipeError> {
        let recipe = form.validate()?;
        self.ensure_ingredients_exist(&recipe.ingredients).await?;

        let repo = RecipeRepository::new(self.pool);
        let id = repo.create(author, &recipe).await?;

        repo.get(id, Some(author))
            .await?
            .ok_or(RecipeError::NotFound)
    }

    /// Apply a partial update; only the author may do so.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if the recipe does not exist.
    /// Returns `RecipeError::Forbidden` if `caller` is not the author.
    /// Returns `RecipeError::Validation` for invalid input.
    /// Returns `RecipeError::Repository` if the database fails.
    #[tracing::instrument(skip_all, fields(caller = %caller, recipe_id = %id))]
    pub async fn update(
        &self,
        caller: UserId,
        id: RecipeId,
        form: RecipePatchForm,
    ) -> Result<Recipe, RecipeError> {
        self.ensure_author(caller, id).await?;

        let patch = form.validate()?;
        if let Some(lines) = &patch.ingredients {
            self.ensure_ingredients_exist(lines).await?;
        }

        let repo = RecipeRepository::new(self.pool);
        repo.update(id, &patch).await?;

        repo.get(id, Some(caller)).await?.ok_or(RecipeError::NotFound)
    }

    /// Delete a recipe; only the author may do so.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::NotFound` if the recipe does not exist.
    /// Returns `RecipeError::Forbidden` if `caller` is not the author.
    /// Returns `RecipeError::Repository` if the database fails.
    #[tracing::instrument(skip_all, fields(caller = %caller, recipe_id = %id))]
    pub async fn delete(&self, caller: UserId, id: RecipeId) -> Result<(), RecipeError> {
        self.ensure_author(caller, id).await?;
        RecipeRepository::new(self.pool).delete(id).await?;
        Ok(())
    }

    async fn ensure_author(&self, caller: UserId, id: RecipeId) -> Result<(), RecipeError> {
        let author = RecipeRepository::new(self.pool)
            .author_of(id)
            .await?
            .ok_or(RecipeError::NotFound)?;

        if author != caller {
            tracing::warn!(recipe_id = %id, caller = %caller, "Non-author attempted to modify recipe");
            return Err(RecipeError::Forbidden);
        }
        Ok(())
    }

    async fn ensure_ingredients_exist(&self, lines: &[RecipeLine]) -> Result<(), RecipeError> {
        let ids: Vec<IngredientId> = lines.iter().map(|l| l.ingredient_id).collect();
        let existing = IngredientRepository::new(self.pool).existing_ids(&ids).await?;

        if let Some(missing) = ids.iter().find(|id| !existing.contains(id)) {
            return Err(RecipeError::Validation(format!(
                "ingredients: ingredient {missing} does not exist"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn form() -> RecipeForm {
        RecipeForm {
            name: "  Pancakes ".to_owned(),
            text: "Mix and fry.".to_owned(),
            cooking_time: 20,
            image: PIXEL.to_owned(),
            ingredients: vec![
                LineForm {
                    id: IngredientId::new(1),
                    amount: 200,
                },
                LineForm {
                    id: IngredientId::new(2),
                    amount: 5,
                },
            ],
        }
    }

    fn validation_message(result: Result<NewRecipe, RecipeError>) -> String {
        match result {
            Err(RecipeError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_form() {
        let recipe = form().validate().unwrap();

        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.cooking_time.get(), 20);
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients.first().unwrap().amount.get(), 200);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut f = form();
        f.name = "   ".to_owned();
        assert!(validation_message(f.validate()).starts_with("name:"));
    }

    #[test]
    fn test_long_name_rejected() {
        let mut f = form();
        f.name = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(validation_message(f.validate()).contains("at most 200"));
    }

    #[test]
    fn test_blank_text_rejected() {
        let mut f = form();
        f.text = "\n".to_owned();
        assert!(validation_message(f.validate()).starts_with("text:"));
    }

    #[test]
    fn test_cooking_time_bounds() {
        let mut f = form();
        f.cooking_time = 0;
        assert_eq!(validation_message(f.validate()), "cooking_time: must be at least 1");

        let mut f = form();
        f.cooking_time = 40_000;
        assert_eq!(
            validation_message(f.validate()),
            "cooking_time: must be at most 32767"
        );
    }

    #[test]
    fn test_empty_ingredients_rejected() {
        let mut f = form();
        f.ingredients.clear();
        assert!(validation_message(f.validate()).contains("at least one ingredient"));
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let mut f = form();
        f.ingredients.push(LineForm {
            id: IngredientId::new(1),
            amount: 3,
        });
        assert!(validation_message(f.validate()).contains("more than once"));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut f = form();
        f.ingredients.last_mut().unwrap().amount = 0;
        assert_eq!(
            validation_message(f.validate()),
            "ingredients: amount of ingredient 2: must be at least 1"
        );
    }

    #[test]
    fn test_image_must_be_data_uri() {
        let mut f = form();
        f.image = "https://example.com/pancakes.png".to_owned();
        assert!(validation_message(f.validate()).starts_with("image:"));
    }

    #[test]
    fn test_patch_validates_only_present_fields() {
        let patch = RecipePatchForm {
            cooking_time: Some(45),
            ..Default::default()
        }
        .validate()
        .unwrap();

        assert_eq!(patch.cooking_time.map(CookingTime::get), Some(45));
        assert!(patch.name.is_none());
        assert!(patch.ingredients.is_none());
    }

    #[test]
    fn test_patch_with_empty_ingredient_list_rejected() {
        let result = RecipePatchForm {
            ingredients: Some(Vec::new()),
            ..Default::default()
        }
        .validate();

        assert!(matches!(result, Err(RecipeError::Validation(_))));
    }
}
