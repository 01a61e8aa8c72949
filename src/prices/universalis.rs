use crate::config::{MissingPricePolicy, UniversalisConfig};
use crate::error::{CraftError, Result};
use crate::http::{build_client, get_json};
use crate::model::{Ingredient, Recipe};
use crate::prices::{select_listing, Listing, PriceSource, PriceTable};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// The market API rejects requests for more ids than this
pub const MAX_IDS_PER_REQUEST: usize = 100;

#[derive(Debug, Deserialize)]
struct ItemListings {
    #[serde(default)]
    listings: Vec<Listing>,
}

#[derive(Debug, Deserialize)]
struct SingleItem {
    #[serde(rename = "itemID")]
    item_id: u64,
    #[serde(default)]
    listings: Vec<Listing>,
}

/// Several ids come back wrapped in `items`, a single id comes back bare
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MarketResponse {
    Multi { items: HashMap<String, ItemListings> },
    Single(SingleItem),
}

impl MarketResponse {
    fn into_items(self) -> HashMap<String, ItemListings> {
        match self {
            MarketResponse::Multi { items } => items,
            MarketResponse::Single(item) => HashMap::from([(
                item.item_id.to_string(),
                ItemListings {
                    listings: item.listings,
                },
            )]),
        }
    }
}

/// Client for the market data API
pub struct UniversalisClient {
    client: Client,
    base_url: String,
    config: UniversalisConfig,
}

impl UniversalisClient {
    /// Create a new client from configuration
    pub fn new(config: &UniversalisConfig, timeout: Duration) -> Result<Self> {
        Ok(UniversalisClient {
            client: build_client(timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config: config.clone(),
        })
    }

    /// Listings for every id in `ids`, one request per chunk of ids
    fn fetch_listings(
        &self,
        scope: &str,
        ids: &[&str],
        query: &[(&str, String)],
    ) -> Result<HashMap<String, ItemListings>> {
        let mut items = HashMap::new();
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let url = format!("{}/api/v2/{}/{}", self.base_url, scope, chunk.join(","));
            let response: MarketResponse = get_json(&self.client, &url, query, &[])?;
            items.extend(response.into_items());
        }
        Ok(items)
    }

    fn unavailable(&self, name: &str, error: CraftError) -> Result<u64> {
        match self.config.missing_price {
            MissingPricePolicy::Zero => {
                warn!("{error}, pricing {name} at 0");
                Ok(0)
            }
            MissingPricePolicy::Fail => Err(error),
        }
    }
}

impl PriceSource for UniversalisClient {
    fn load_ingredient_prices(&self, ingredients: &[Ingredient]) -> Result<PriceTable> {
        let mut table = PriceTable::new();
        if ingredients.is_empty() {
            return Ok(table);
        }

        let ids: Vec<&str> = ingredients.iter().map(|i| i.id.as_str()).collect();
        let query = [("listings", self.config.ingredient_listings.to_string())];
        let items = self.fetch_listings(&self.config.ingredient_scope, &ids, &query)?;
        let bulk_quantity = self.config.bulk_quantity;

        for ingredient in ingredients {
            let price = match items.get(&ingredient.id) {
                None => self.unavailable(
                    &ingredient.name,
                    CraftError::MissingPrice(ingredient.id.clone()),
                )?,
                Some(item) => match select_listing(&item.listings, bulk_quantity) {
                    Some(listing) => {
                        if listing.quantity <= bulk_quantity {
                            debug!(
                                "No listing of {} above {} units, using the last one",
                                ingredient.name, bulk_quantity
                            );
                        }
                        listing.price_per_unit
                    }
                    None => self.unavailable(
                        &ingredient.name,
                        CraftError::NoListings(ingredient.id.clone()),
                    )?,
                },
            };
            table.push(ingredient.name.clone(), price);
        }

        info!("Resolved prices for {} ingredients", table.len());
        Ok(table)
    }

    fn load_item_prices(&self, recipes: &[Recipe]) -> Result<PriceTable> {
        let mut table = PriceTable::new();
        if recipes.is_empty() {
            return Ok(table);
        }

        let ids: Vec<&str> = recipes.iter().map(|r| r.id.as_str()).collect();
        let query = [("listings", "1".to_string()), ("hq", "true".to_string())];
        let items = self.fetch_listings(&self.config.item_scope, &ids, &query)?;

        for recipe in recipes {
            let price = match items.get(&recipe.id) {
                None => {
                    self.unavailable(&recipe.name, CraftError::MissingPrice(recipe.id.clone()))?
                }
                Some(item) => match item.listings.first() {
                    Some(listing) => listing.price_per_unit,
                    None => {
                        debug!("No HQ listings for {}, sell price is 0", recipe.name);
                        0
                    }
                },
            };
            table.push(recipe.name.clone(), price);
        }

        info!("Resolved sell prices for {} items", table.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn ingredient(id: &str, name: &str) -> Ingredient {
        Ingredient::new(id, name, 1)
    }

    fn recipe(id: &str, name: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: name.to_string(),
            ingredients: vec![],
        }
    }

    fn client(url: String, policy: MissingPricePolicy) -> UniversalisClient {
        let config = UniversalisConfig {
            base_url: url,
            missing_price: policy,
            ..UniversalisConfig::default()
        };
        UniversalisClient::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_ingredient_prices_use_bulk_heuristic() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/v2/Chaos/1,2")
            .match_query(Matcher::UrlEncoded("listings".into(), "10".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": {
                    "1": {"listings": [
                        {"quantity": 5, "pricePerUnit": 10},
                        {"quantity": 40, "pricePerUnit": 8},
                        {"quantity": 50, "pricePerUnit": 6}
                    ]},
                    "2": {"listings": [
                        {"quantity": 5, "pricePerUnit": 10},
                        {"quantity": 2, "pricePerUnit": 20}
                    ]}
                }}"#,
            )
            .expect(1)
            .create();

        let prices = client(server.url(), MissingPricePolicy::Zero)
            .load_ingredient_prices(&[ingredient("1", "Iron Ore"), ingredient("2", "Fire Shard")])
            .unwrap();

        assert_eq!(prices.entries()[0].name, "Iron Ore");
        assert_eq!(prices.entries()[0].price, 8);
        assert_eq!(prices.entries()[1].name, "Fire Shard");
        assert_eq!(prices.entries()[1].price, 20);
        mock.assert();
    }

    #[test]
    fn test_single_id_response_shape() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/api/v2/Chaos/5057")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"itemID": 5057, "listings": [{"quantity": 99, "pricePerUnit": 4}]}"#)
            .create();

        let prices = client(server.url(), MissingPricePolicy::Fail)
            .load_ingredient_prices(&[ingredient("5057", "Iron Ore")])
            .unwrap();

        assert_eq!(prices.get("Iron Ore"), Some(4));
    }

    #[test]
    fn test_item_prices_request_hq_single_listing() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/api/v2/Omega/100,200")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("listings".into(), "1".into()),
                Matcher::UrlEncoded("hq".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"items": {
                    "100": {"listings": [{"quantity": 1, "pricePerUnit": 150000}]},
                    "200": {"listings": []}
                }}"#,
            )
            .expect(1)
            .create();

        let prices = client(server.url(), MissingPricePolicy::Fail)
            .load_item_prices(&[recipe("100", "Sword"), recipe("200", "Shield")])
            .unwrap();

        assert_eq!(prices.get("Sword"), Some(150000));
        // An item nobody sells is worth 0, not an error
        assert_eq!(prices.get("Shield"), Some(0));
        mock.assert();
    }

    #[test]
    fn test_missing_entry_defaults_to_zero() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/api/v2/Chaos/1,2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": {"1": {"listings": [{"quantity": 31, "pricePerUnit": 7}]}}, "unresolvedItems": [2]}"#)
            .create();

        let prices = client(server.url(), MissingPricePolicy::Zero)
            .load_ingredient_prices(&[ingredient("1", "A"), ingredient("2", "B")])
            .unwrap();

        assert_eq!(prices.get("A"), Some(7));
        assert_eq!(prices.get("B"), Some(0));
    }

    #[test]
    fn test_missing_entry_can_fail() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/api/v2/Chaos/1,2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": {"1": {"listings": []}}}"#)
            .create();

        let err = client(server.url(), MissingPricePolicy::Fail)
            .load_ingredient_prices(&[ingredient("1", "A"), ingredient("2", "B")])
            .unwrap_err();

        // The empty listing for "1" is hit first
        assert!(matches!(err, CraftError::NoListings(id) if id == "1"));
    }

    #[test]
    fn test_empty_input_makes_no_request() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", Matcher::Any)
            .match_query(Matcher::Any)
            .expect(0)
            .create();

        let client = client(server.url(), MissingPricePolicy::Fail);
        assert!(client.load_ingredient_prices(&[]).unwrap().is_empty());
        assert!(client.load_item_prices(&[]).unwrap().is_empty());
        mock.assert();
    }

    #[test]
    fn test_ids_are_chunked() {
        let mut server = Server::new();
        let ingredients: Vec<Ingredient> = (0..MAX_IDS_PER_REQUEST + 1)
            .map(|i| ingredient(&i.to_string(), &format!("Item {i}")))
            .collect();
        let mock = server
            .mock("GET", Matcher::Regex(r"^/api/v2/Chaos/".into()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"items": {}}"#)
            .expect(2)
            .create();

        let prices = client(server.url(), MissingPricePolicy::Zero)
            .load_ingredient_prices(&ingredients)
            .unwrap();

        assert_eq!(prices.len(), MAX_IDS_PER_REQUEST + 1);
        mock.assert();
    }

    #[test]
    fn test_malformed_response_is_a_decode_error() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/api/v2/Omega/1,2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"unexpected": true}"#)
            .create();

        let err = client(server.url(), MissingPricePolicy::Zero)
            .load_item_prices(&[recipe("1", "A"), recipe("2", "B")])
            .unwrap_err();

        assert!(matches!(err, CraftError::DecodeError { .. }));
    }
}
