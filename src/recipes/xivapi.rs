use crate::config::XivApiConfig;
use crate::error::{CraftError, Result};
use crate::http::{build_client, get_json};
use crate::model::{Ingredient, Recipe};
use crate::recipes::RecipeSource;
use log::{debug, info};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Number of ingredient slots a recipe record exposes (`ItemIngredient0..7`).
///
/// This is a limit of the data source, not of recipes in general.
pub const MAX_INGREDIENT_SLOTS: usize = 8;

const PRIVATE_KEY_PARAM: &str = "private_key";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Results")]
    results: Vec<SearchResult>,
    #[serde(rename = "Pagination", default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(rename = "PageNext")]
    page_next: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Url")]
    url: String,
}

/// Ids come back as numbers, but tolerate strings too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(id) => write!(f, "{id}"),
            ItemId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IngredientItem {
    #[serde(rename = "ID")]
    id: ItemId,
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecipeDetail {
    #[serde(rename = "ItemResultTargetID")]
    item_result_target_id: ItemId,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl RecipeDetail {
    /// The ingredient in `slot`, or `None` when the slot is empty.
    fn ingredient(&self, slot: usize, url: &str) -> Result<Option<Ingredient>> {
        let item = match self.fields.get(&format!("ItemIngredient{slot}")) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => IngredientItem::deserialize(value).map_err(|source| {
                CraftError::DecodeError {
                    url: url.to_string(),
                    source,
                }
            })?,
        };

        let amount = self
            .fields
            .get(&format!("AmountIngredient{slot}"))
            .and_then(Value::as_u64)
            .and_then(|amount| u32::try_from(amount).ok())
            .ok_or_else(|| CraftError::MissingAmount {
                url: url.to_string(),
                slot,
            })?;

        Ok(Some(Ingredient::new(item.id.to_string(), item.name, amount)))
    }

    fn ingredients(&self, url: &str) -> Result<Vec<Ingredient>> {
        let mut ingredients = Vec::new();
        for slot in 0..MAX_INGREDIENT_SLOTS {
            if let Some(ingredient) = self.ingredient(slot, url)? {
                ingredients.push(ingredient);
            }
        }
        Ok(ingredients)
    }
}

/// Client for the recipe search API
pub struct XivApiClient {
    client: Client,
    base_url: String,
    private_key: Option<String>,
    search_filter: String,
}

impl XivApiClient {
    /// Create a new client from configuration
    pub fn new(config: &XivApiConfig, timeout: Duration) -> Result<Self> {
        Ok(XivApiClient {
            client: build_client(timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            private_key: config.private_key.clone(),
            search_filter: config.search_filter.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, search_filter: String) -> Result<Self> {
        let config = XivApiConfig {
            base_url,
            private_key: None,
            search_filter,
        };
        Self::new(&config, Duration::from_secs(30))
    }

    fn request<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<T> {
        if let Some(key) = &self.private_key {
            query.push((PRIVATE_KEY_PARAM, key.clone()));
        }
        get_json(&self.client, url, &query, &[PRIVATE_KEY_PARAM])
    }

    fn search_page(&self, page: Option<u32>) -> Result<SearchResponse> {
        let mut query = vec![
            ("indexes", "Recipe".to_string()),
            ("string", self.search_filter.clone()),
        ];
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }
        self.request(&format!("{}/search", self.base_url), query)
    }

    fn detail_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    fn fetch_recipe(&self, result: &SearchResult) -> Result<Recipe> {
        let url = self.detail_url(&result.url);
        let detail: RecipeDetail = self.request(&url, Vec::new())?;
        let ingredients = detail.ingredients(&url)?;
        debug!("{} uses {} ingredients", result.name, ingredients.len());

        Ok(Recipe {
            id: detail.item_result_target_id.to_string(),
            name: result.name.clone(),
            ingredients,
        })
    }
}

impl RecipeSource for XivApiClient {
    fn load_recipes(&self) -> Result<Vec<Recipe>> {
        let mut recipes = Vec::new();
        let mut page = None;

        loop {
            let response = self.search_page(page)?;
            for result in &response.results {
                recipes.push(self.fetch_recipe(result)?);
            }

            let next = response.pagination.and_then(|p| p.page_next);
            match next {
                Some(next) if next > page.unwrap_or(1) => page = Some(next),
                _ => break,
            }
        }

        info!(
            "Loaded {} recipes matching '{}'",
            recipes.len(),
            self.search_filter
        );
        Ok(recipes)
    }
}
