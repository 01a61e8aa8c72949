use crate::error::{CraftError, Result};
use crate::model::{unique_ingredients, Recipe};
use crate::prices::PriceTable;
use crate::spreadsheet::cell::{CellRange, CellRef, Formula};
use std::collections::BTreeMap;

pub const RECIPES_SHEET: &str = "recipes";
pub const PRICES_SHEET: &str = "prices";
pub const RESULTS_SHEET: &str = "results";

const SELL_PRICE_COL: u16 = 1;
const CRAFT_PRICE_COL: u16 = 2;
const DIFFERENCE_COL: u16 = 3;
/// Left blank for the reader to fill with how many of each recipe they plan to craft
const AMOUNT_COL: u16 = 4;
const FIRST_USAGE_COL: u16 = 6;

/// Largest sheet an xlsx file can hold
const MAX_ROWS: u32 = 1_048_576;
const MAX_COLS: u16 = 16_384;

const ITEM_NAME_COL: u16 = 3;
const ITEM_PRICE_COL: u16 = 4;

/// Contents of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Formula(Formula),
    /// Single-cell array formula
    ArrayFormula(Formula),
}

/// A named sheet: a sparse grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: &'static str,
    cells: BTreeMap<(u32, u16), CellValue>,
}

impl Sheet {
    fn new(name: &'static str) -> Self {
        Sheet {
            name,
            cells: BTreeMap::new(),
        }
    }

    fn set(&mut self, row: u32, col: u16, value: CellValue) {
        self.cells.insert((row, col), value);
    }

    fn text(&mut self, row: u32, col: u16, text: &str) {
        self.set(row, col, CellValue::Text(text.to_string()));
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// All written cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u16), &CellValue)> {
        self.cells.iter()
    }
}

/// The three sheets of the report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub recipes: Sheet,
    pub prices: Sheet,
    pub results: Sheet,
}

impl ReportLayout {
    /// Sheets in workbook order
    pub fn sheets(&self) -> [&Sheet; 3] {
        [&self.recipes, &self.prices, &self.results]
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets().into_iter().find(|sheet| sheet.name == name)
    }
}

/// Lay out the report for `recipes`.
///
/// `ingredient_prices` must follow the order of [`unique_ingredients`] and
/// `item_prices` the order of `recipes`; the formulas pair rows by position.
///
/// # Errors
///
/// Returns [`CraftError::LayoutTooLarge`] when a sheet would need more rows
/// or columns than an xlsx worksheet holds.
pub fn build_layout(
    recipes: &[Recipe],
    ingredient_prices: &PriceTable,
    item_prices: &PriceTable,
) -> Result<ReportLayout> {
    let ingredients = unique_ingredients(recipes);
    // One header row above the recipes
    let recipe_count = row_count("recipes", recipes.len(), MAX_ROWS - 1)?;
    let ingredient_count = u16::try_from(ingredients.len())
        .ok()
        .filter(|count| *count <= MAX_COLS - FIRST_USAGE_COL)
        .ok_or(CraftError::LayoutTooLarge {
            what: "ingredients",
            count: ingredients.len(),
        })?;
    row_count("ingredient prices", ingredient_prices.len(), MAX_ROWS)?;
    row_count("item prices", item_prices.len(), MAX_ROWS)?;

    // recipes: amount of ingredient c used by recipe r at (r + 1, c + 1)
    let mut recipes_sheet = Sheet::new(RECIPES_SHEET);
    for (row, recipe) in (1..).zip(recipes) {
        recipes_sheet.text(row, 0, &recipe.name);
    }
    for (col, ingredient) in (1..).zip(&ingredients) {
        recipes_sheet.text(0, col, &ingredient.name);
        for (row, recipe) in (1..).zip(recipes) {
            if let Some(amount) = recipe.amount_of(ingredient) {
                recipes_sheet.set(row, col, CellValue::Number(f64::from(amount)));
            }
        }
    }

    let mut prices_sheet = Sheet::new(PRICES_SHEET);
    for (row, entry) in (0..).zip(ingredient_prices.entries()) {
        prices_sheet.text(row, 0, &entry.name);
        prices_sheet.set(row, 1, CellValue::Number(entry.price as f64));
    }
    for (row, entry) in (0..).zip(item_prices.entries()) {
        prices_sheet.text(row, ITEM_NAME_COL, &entry.name);
        prices_sheet.set(row, ITEM_PRICE_COL, CellValue::Number(entry.price as f64));
    }

    let mut results_sheet = Sheet::new(RESULTS_SHEET);
    results_sheet.text(0, SELL_PRICE_COL, "Sell price");
    results_sheet.text(0, CRAFT_PRICE_COL, "Craft price");
    results_sheet.text(0, DIFFERENCE_COL, "Difference");
    results_sheet.text(0, AMOUNT_COL, "Amount");

    for (index, recipe) in (0u32..).zip(recipes) {
        let row = index + 1;
        results_sheet.text(row, 0, &recipe.name);

        results_sheet.set(
            row,
            SELL_PRICE_COL,
            CellValue::Formula(Formula::Reference(CellRange::single(
                Some(PRICES_SHEET),
                CellRef::absolute(index, ITEM_PRICE_COL),
            ))),
        );

        let craft_price = if ingredient_count == 0 {
            CellValue::Number(0.0)
        } else {
            CellValue::ArrayFormula(Formula::SumProduct {
                left: CellRange::new(
                    Some(RECIPES_SHEET),
                    CellRef::absolute(row, 1),
                    CellRef::absolute(row, ingredient_count),
                ),
                right: CellRange::new(
                    Some(PRICES_SHEET),
                    CellRef::absolute(0, 1),
                    CellRef::absolute(u32::from(ingredient_count) - 1, 1),
                ),
                transpose_right: true,
            })
        };
        results_sheet.set(row, CRAFT_PRICE_COL, craft_price);

        results_sheet.set(
            row,
            DIFFERENCE_COL,
            CellValue::Formula(Formula::Difference {
                minuend: CellRef::new(row, SELL_PRICE_COL),
                subtrahend: CellRef::new(row, CRAFT_PRICE_COL),
            }),
        );
    }

    // Total use of each ingredient, weighted by the Amount column
    for (recipes_col, ingredient) in (1u16..).zip(&ingredients) {
        let col = FIRST_USAGE_COL + recipes_col - 1;
        results_sheet.text(0, col, &ingredient.name);
        results_sheet.set(
            1,
            col,
            CellValue::ArrayFormula(Formula::SumProduct {
                left: CellRange::new(
                    None,
                    CellRef::new(1, AMOUNT_COL),
                    CellRef::new(recipe_count, AMOUNT_COL),
                ),
                right: CellRange::new(
                    Some(RECIPES_SHEET),
                    CellRef::absolute(1, recipes_col),
                    CellRef::absolute(recipe_count, recipes_col),
                ),
                transpose_right: false,
            }),
        );
    }

    Ok(ReportLayout {
        recipes: recipes_sheet,
        prices: prices_sheet,
        results: results_sheet,
    })
}

fn row_count(what: &'static str, count: usize, max: u32) -> Result<u32> {
    u32::try_from(count)
        .ok()
        .filter(|rows| *rows <= max)
        .ok_or(CraftError::LayoutTooLarge { what, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Ingredient;

    fn recipes() -> Vec<Recipe> {
        vec![
            Recipe {
                id: "100".to_string(),
                name: "A".to_string(),
                ingredients: vec![Ingredient::new("x", "X", 2)],
            },
            Recipe {
                id: "200".to_string(),
                name: "B".to_string(),
                ingredients: vec![Ingredient::new("x", "X", 3), Ingredient::new("y", "Y", 1)],
            },
        ]
    }

    fn layout() -> ReportLayout {
        let ingredient_prices: PriceTable = vec![("X", 10), ("Y", 7)].into_iter().collect();
        let item_prices: PriceTable = vec![("A", 50), ("B", 30)].into_iter().collect();
        build_layout(&recipes(), &ingredient_prices, &item_prices).unwrap()
    }

    fn text(sheet: &Sheet, row: u32, col: u16) -> Option<&str> {
        match sheet.get(row, col) {
            Some(CellValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn number(sheet: &Sheet, row: u32, col: u16) -> Option<f64> {
        match sheet.get(row, col) {
            Some(CellValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[test]
    fn test_recipes_sheet() {
        let layout = layout();
        let sheet = &layout.recipes;

        assert_eq!(sheet.name, "recipes");
        assert!(sheet.get(0, 0).is_none());
        assert_eq!(text(sheet, 0, 1), Some("X"));
        assert_eq!(text(sheet, 0, 2), Some("Y"));
        assert_eq!(text(sheet, 1, 0), Some("A"));
        assert_eq!(number(sheet, 1, 1), Some(2.0));
        // A does not use Y: no value at all, not zero
        assert!(sheet.get(1, 2).is_none());
        assert_eq!(text(sheet, 2, 0), Some("B"));
        assert_eq!(number(sheet, 2, 1), Some(3.0));
        assert_eq!(number(sheet, 2, 2), Some(1.0));
    }

    #[test]
    fn test_prices_sheet() {
        let layout = layout();
        let sheet = &layout.prices;

        assert_eq!(text(sheet, 0, 0), Some("X"));
        assert_eq!(number(sheet, 0, 1), Some(10.0));
        assert_eq!(text(sheet, 1, 0), Some("Y"));
        assert_eq!(number(sheet, 1, 1), Some(7.0));
        assert_eq!(text(sheet, 0, 3), Some("A"));
        assert_eq!(number(sheet, 0, 4), Some(50.0));
        assert_eq!(text(sheet, 1, 3), Some("B"));
        assert_eq!(number(sheet, 1, 4), Some(30.0));
    }

    #[test]
    fn test_results_headers_and_formulas() {
        let layout = layout();
        let sheet = &layout.results;

        assert_eq!(text(sheet, 0, 1), Some("Sell price"));
        assert_eq!(text(sheet, 0, 2), Some("Craft price"));
        assert_eq!(text(sheet, 0, 3), Some("Difference"));
        assert_eq!(text(sheet, 0, 4), Some("Amount"));
        assert_eq!(text(sheet, 1, 0), Some("A"));
        assert_eq!(text(sheet, 2, 0), Some("B"));

        match sheet.get(2, 2) {
            Some(CellValue::ArrayFormula(formula)) => assert_eq!(
                formula.to_string(),
                "=SUMPRODUCT(recipes!$B$3:$C$3, TRANSPOSE(prices!$B$1:$B$2))"
            ),
            other => panic!("expected array formula, got {other:?}"),
        }
        match sheet.get(2, 1) {
            Some(CellValue::Formula(formula)) => assert_eq!(formula.to_string(), "=prices!$E$2"),
            other => panic!("expected formula, got {other:?}"),
        }
        match sheet.get(1, 3) {
            Some(CellValue::Formula(formula)) => assert_eq!(formula.to_string(), "=B2 - C2"),
            other => panic!("expected formula, got {other:?}"),
        }

        assert_eq!(text(sheet, 0, 6), Some("X"));
        assert_eq!(text(sheet, 0, 7), Some("Y"));
        match sheet.get(1, 7) {
            Some(CellValue::ArrayFormula(formula)) => {
                assert_eq!(formula.to_string(), "=SUMPRODUCT(E2:E3, recipes!$C$2:$C$3)")
            }
            other => panic!("expected array formula, got {other:?}"),
        }
        // The Amount column itself is left for the reader
        assert!(sheet.get(1, 4).is_none());
    }

    #[test]
    fn test_no_recipes() {
        let layout = build_layout(&[], &PriceTable::new(), &PriceTable::new()).unwrap();

        assert_eq!(layout.recipes.cells().count(), 0);
        assert_eq!(layout.prices.cells().count(), 0);
        // Only the header row
        assert_eq!(layout.results.cells().count(), 4);
    }

    #[test]
    fn test_recipes_without_ingredients() {
        let recipes = vec![Recipe {
            id: "1".to_string(),
            name: "Nothing".to_string(),
            ingredients: vec![],
        }];
        let item_prices: PriceTable = vec![("Nothing", 9)].into_iter().collect();
        let layout = build_layout(&recipes, &PriceTable::new(), &item_prices).unwrap();

        assert_eq!(number(&layout.results, 1, 2), Some(0.0));
        match layout.results.get(1, 3) {
            Some(CellValue::Formula(formula)) => assert_eq!(formula.to_string(), "=B2 - C2"),
            other => panic!("expected formula, got {other:?}"),
        }
        assert!(layout.results.get(0, 6).is_none());
    }

    #[test]
    fn test_too_many_ingredients_is_an_error() {
        let count = usize::from(MAX_COLS - FIRST_USAGE_COL) + 1;
        let recipes = vec![Recipe {
            id: "1".to_string(),
            name: "Everything".to_string(),
            ingredients: (0..count)
                .map(|i| Ingredient::new(i.to_string(), format!("Item {i}"), 1))
                .collect(),
        }];

        let err = build_layout(&recipes, &PriceTable::new(), &PriceTable::new()).unwrap_err();
        assert!(matches!(
            err,
            CraftError::LayoutTooLarge { what: "ingredients", count: n } if n == count
        ));
    }

    #[test]
    fn test_widest_layout_fits() {
        let count = usize::from(MAX_COLS - FIRST_USAGE_COL);
        let recipes = vec![Recipe {
            id: "1".to_string(),
            name: "Everything".to_string(),
            ingredients: (0..count)
                .map(|i| Ingredient::new(i.to_string(), format!("Item {i}"), 1))
                .collect(),
        }];

        let layout = build_layout(&recipes, &PriceTable::new(), &PriceTable::new()).unwrap();
        assert!(layout.results.get(0, MAX_COLS - 1).is_some());
    }

    #[test]
    fn test_sheet_lookup() {
        let layout = layout();
        let names: Vec<&str> = layout.sheets().iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["recipes", "prices", "results"]);
        assert!(layout.sheet("prices").is_some());
        assert!(layout.sheet("summary").is_none());
    }
}
