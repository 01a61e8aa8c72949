use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// A component item and the quantity of it needed per craft.
///
/// Identity is the item id alone: two ingredients with the same id are the
/// same item even if their name or amount differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub amount: u32,
}

impl Ingredient {
    pub fn new(id: impl Into<String>, name: impl Into<String>, amount: u32) -> Self {
        Ingredient {
            id: id.into(),
            name: name.into(),
            amount,
        }
    }
}

impl PartialEq for Ingredient {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Ingredient {}

impl Hash for Ingredient {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A craftable item plus the ingredients required to produce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Id of the item the recipe produces
    pub id: String,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Amount of `ingredient` this recipe uses, if it uses it at all.
    ///
    /// When the same item is listed more than once the last amount wins.
    pub fn amount_of(&self, ingredient: &Ingredient) -> Option<u32> {
        self.ingredients
            .iter()
            .rfind(|candidate| *candidate == ingredient)
            .map(|found| found.amount)
    }
}

/// Ingredients used across `recipes`, de-duplicated by id, in first-seen order.
pub fn unique_ingredients(recipes: &[Recipe]) -> Vec<Ingredient> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            if seen.insert(ingredient.id.as_str()) {
                unique.push(ingredient.clone());
            }
        }
    }
    unique
}
