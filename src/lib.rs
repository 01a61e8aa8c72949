pub mod builder;
pub mod config;
pub mod error;
mod http;
pub mod model;
pub mod prices;
pub mod recipes;
pub mod spreadsheet;

pub use builder::{Report, ReportBuilder};
pub use config::{MissingPricePolicy, Settings};
pub use error::{CraftError, Result};
pub use model::{unique_ingredients, Ingredient, Recipe};
pub use prices::{
    select_listing, Listing, PriceEntry, PriceSource, PriceTable, UniversalisClient,
};
pub use recipes::{from_json, RecipeSource, XivApiClient};
pub use spreadsheet::generate_xlsx;

