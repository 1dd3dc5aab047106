//! Ingredient catalog import.
//!
//! # Usage
//!
//! ```bash
//! pantry-cli ingredients import data/ingredients.json
//! ```
//!
//! The file is a JSON array of `{"name": ..., "measurement_unit": ...}`
//! objects. Entries already in the catalog are skipped, so the command can
//! be re-run safely.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use pantry_api::db::{IngredientRepository, create_pool};

use super::{CommandError, database_url};

/// Longest accepted name or unit, matching the column width.
const MAX_FIELD_LENGTH: usize = 200;

/// Rows sent per `INSERT`.
const BATCH_SIZE: usize = 1000;

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

/// Parse and validate an ingredient file's contents.
///
/// Names and units are trimmed; duplicate pairs inside the file collapse
/// into one entry. The result is sorted.
fn parse_entries(content: &str) -> Result<Vec<(String, String)>, CommandError> {
    let records: Vec<IngredientRecord> =
        serde_json::from_str(content).map_err(|e| CommandError::InvalidFile(e.to_string()))?;

    let mut entries = BTreeSet::new();
    for (index, record) in records.into_iter().enumerate() {
        let name = record.name.trim();
        let unit = record.measurement_unit.trim();

        for (field, value) in [("name", name), ("measurement_unit", unit)] {
            if value.is_empty() {
                return Err(CommandError::InvalidFile(format!(
                    "entry {index}: {field} must not be empty"
                )));
            }
            if value.chars().count() > MAX_FIELD_LENGTH {
                return Err(CommandError::InvalidFile(format!(
                    "entry {index}: {field} must be at most {MAX_FIELD_LENGTH} characters"
                )));
            }
        }

        entries.insert((name.to_owned(), unit.to_owned()));
    }

    Ok(entries.into_iter().collect())
}

/// Load ingredients from `path` into the catalog.
///
/// # Errors
///
/// Returns `CommandError` if the file cannot be read or parsed, or a
/// database operation fails.
pub async fn import(path: &Path) -> Result<(), CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: path.display().to_string(),
            source,
        })?;

    let entries = parse_entries(&content)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "Parsed ingredient file");

    let pool = create_pool(&database_url()?, 2).await?;
    let repo = IngredientRepository::new(&pool);

    let mut inserted: u64 = 0;
    for batch in entries.chunks(BATCH_SIZE) {
        inserted += repo.bulk_insert(batch).await?;
    }

    let total = repo.count().await?;
    tracing::info!(
        inserted,
        skipped = u64::try_from(entries.len()).unwrap_or(u64::MAX).saturating_sub(inserted),
        total,
        "Ingredient import complete"
    );
    Ok(())
}
