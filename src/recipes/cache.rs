//! JSON file cache for fetched recipes.
//!
//! There is no expiry: delete the file to force a refetch.

use crate::error::Result;
use crate::model::Recipe;
use crate::recipes::RecipeSource;
use log::info;
use std::fs;
use std::path::Path;

/// Serialize `recipes` to `path`, replacing any existing file.
pub fn write_cache(path: &Path, recipes: &[Recipe]) -> Result<()> {
    let content = serde_json::to_string_pretty(recipes)?;
    fs::write(path, content)?;
    info!("Saved {} recipes to {}", recipes.len(), path.display());
    Ok(())
}

/// Read the recipe list stored at `path`.
pub fn read_cache(path: &Path) -> Result<Vec<Recipe>> {
    let content = fs::read_to_string(path)?;
    let recipes: Vec<Recipe> = serde_json::from_str(&content)?;
    Ok(recipes)
}

/// Load recipes from the cache at `path`, filling it from `source` first when
/// the file does not exist.
///
/// The returned list is always what was read back from disk. A corrupt cache
/// file is reported as an error rather than refetched.
pub fn from_json<S: RecipeSource + ?Sized>(path: &Path, source: &S) -> Result<Vec<Recipe>> {
    if path.exists() {
        info!("Using cached recipes from {}", path.display());
    } else {
        info!("No recipe cache at {}, fetching", path.display());
        let recipes = source.load_recipes()?;
        write_cache(path, &recipes)?;
    }

    read_cache(path)
}
