mod universalis;

pub use universalis::{UniversalisClient, MAX_IDS_PER_REQUEST};

use crate::error::Result;
use crate::model::{Ingredient, Recipe};
use serde::Deserialize;

/// A single market sell offer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Listing {
    pub quantity: u32,
    #[serde(rename = "pricePerUnit")]
    pub price_per_unit: u64,
}

/// Pick the listing that represents an item's price.
///
/// The first listing, in market order, whose quantity exceeds `bulk_quantity`
/// wins. Without one, the last listing is used. `None` only for an empty slice.
pub fn select_listing(listings: &[Listing], bulk_quantity: u32) -> Option<&Listing> {
    listings
        .iter()
        .find(|listing| listing.quantity > bulk_quantity)
        .or_else(|| listings.last())
}

/// One row of a price table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceEntry {
    pub name: String,
    pub price: u64,
}

/// Unit prices in the order the entities were requested.
///
/// Rows are never merged, even when two entities share a name, so row `i`
/// always belongs to the `i`-th requested entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    entries: Vec<PriceEntry>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, price: u64) {
        self.entries.push(PriceEntry {
            name: name.into(),
            price,
        });
    }

    /// Price of the first entry called `name`
    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.price)
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, u64)> for PriceTable {
    fn from_iter<I: IntoIterator<Item = (N, u64)>>(iter: I) -> Self {
        let mut table = PriceTable::new();
        for (name, price) in iter {
            table.push(name, price);
        }
        table
    }
}

/// Source of unit prices for ingredients and crafted items
pub trait PriceSource {
    /// Buy price of each ingredient, keyed by ingredient name, in input order
    fn load_ingredient_prices(&self, ingredients: &[Ingredient]) -> Result<PriceTable>;

    /// Sell price of each recipe's result, keyed by recipe name, in input order
    fn load_item_prices(&self, recipes: &[Recipe]) -> Result<PriceTable>;
}
