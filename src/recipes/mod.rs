mod cache;
mod xivapi;

pub use cache::{from_json, read_cache, write_cache};
pub use xivapi::{XivApiClient, MAX_INGREDIENT_SLOTS};

use crate::error::Result;
use crate::model::Recipe;

/// Anything that can produce the list of recipes to report on
pub trait RecipeSource {
    fn load_recipes(&self) -> Result<Vec<Recipe>>;
}
