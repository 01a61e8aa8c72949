use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::info;

use crate::config::Settings;
use crate::error::Result;
use crate::prices::{PriceSource, UniversalisClient};
use crate::recipes::{from_json, RecipeSource, XivApiClient};
use crate::spreadsheet::generate_xlsx;

/// Builder for configuring and producing a profit report
#[derive(Debug, Default)]
pub struct ReportBuilder {
    settings: Option<Settings>,
    cache_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    refresh: bool,
}

impl ReportBuilder {
    /// Use these settings instead of the defaults
    ///
    /// # Example
    /// ```
    /// use craft_margin::{Report, Settings};
    ///
    /// let builder = Report::builder().settings(Settings::default());
    /// ```
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set where fetched recipes are cached, overriding the settings
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Set where the spreadsheet is written, overriding the settings
    ///
    /// # Example
    /// ```
    /// use craft_margin::Report;
    ///
    /// let builder = Report::builder()
    ///     .cache_path("diadochos.json")
    ///     .output_path("diadochos.xlsx");
    /// ```
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Discard the recipe cache before loading, forcing a refetch
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Fetch recipes and prices from the configured APIs and write the report
    ///
    /// # Returns
    /// The path of the written spreadsheet
    ///
    /// # Errors
    /// Returns `CraftError` if:
    /// - Either API cannot be reached or answers with an unexpected shape
    /// - The cache cannot be read, parsed or written
    /// - The spreadsheet cannot be written
    pub fn build(self) -> Result<PathBuf> {
        let settings = self.settings.clone().unwrap_or_default();
        let timeout = Duration::from_secs(settings.timeout);
        let recipes = XivApiClient::new(&settings.xivapi, timeout)?;
        let prices = UniversalisClient::new(&settings.universalis, timeout)?;
        self.build_with(&recipes, &prices)
    }

    /// Write the report using the given data sources
    pub fn build_with<R, P>(self, recipes: &R, prices: &P) -> Result<PathBuf>
    where
        R: RecipeSource + ?Sized,
        P: PriceSource + ?Sized,
    {
        let settings = self.settings.unwrap_or_default();
        let cache_path = self.cache_path.unwrap_or(settings.cache_path);
        let output_path = self.output_path.unwrap_or(settings.output_path);

        if self.refresh && cache_path.exists() {
            info!("Discarding recipe cache {}", cache_path.display());
            fs::remove_file(&cache_path)?;
        }

        let recipes = from_json(&cache_path, recipes)?;
        generate_xlsx(&output_path, &recipes, prices)?;
        Ok(output_path)
    }
}

/// Main entry point for the builder API
pub struct Report;

impl Report {
    /// Creates a new builder for a profit report
    ///
    /// # Example
    /// ```
    /// use craft_margin::Report;
    ///
    /// let builder = Report::builder();
    /// ```
    pub fn builder() -> ReportBuilder {
        ReportBuilder::default()
    }
}
