//! The profit spreadsheet.
//!
//! Three sheets are written: `recipes` (ingredient amounts per recipe),
//! `prices` (ingredient and sell prices) and `results`, whose cells are live
//! formulas over the other two. Nothing is precomputed, so edits to the data
//! sheets or the `Amount` column recalculate in the spreadsheet application.

pub mod cell;
mod layout;

pub use layout::{
    build_layout, CellValue, ReportLayout, Sheet, PRICES_SHEET, RECIPES_SHEET, RESULTS_SHEET,
};

use crate::error::Result;
use crate::model::{unique_ingredients, Recipe};
use crate::prices::PriceSource;
use log::info;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Resolve prices for `recipes` and write the report to `path`.
///
/// The workbook is assembled in memory and only saved once every price has
/// been resolved; a failed save can still leave a partial file behind.
pub fn generate_xlsx<P: PriceSource + ?Sized>(
    path: &Path,
    recipes: &[Recipe],
    prices: &P,
) -> Result<()> {
    let ingredients = unique_ingredients(recipes);
    info!(
        "Building report for {} recipes using {} distinct ingredients",
        recipes.len(),
        ingredients.len()
    );

    let ingredient_prices = prices.load_ingredient_prices(&ingredients)?;
    let item_prices = prices.load_item_prices(recipes)?;
    let layout = build_layout(recipes, &ingredient_prices, &item_prices)?;

    write_layout(path, &layout)?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Write `layout` as an xlsx workbook at `path`.
pub fn write_layout(path: &Path, layout: &ReportLayout) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in layout.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (&(row, col), value) in sheet.cells() {
            match value {
                CellValue::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row, col, *number)?;
                }
                CellValue::Formula(formula) => {
                    worksheet.write_formula(row, col, formula.to_string().as_str())?;
                }
                CellValue::ArrayFormula(formula) => {
                    worksheet.write_array_formula(
                        row,
                        col,
                        row,
                        col,
                        formula.to_string().as_str(),
                    )?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
