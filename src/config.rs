use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Recipe search API settings
    #[serde(default)]
    pub xivapi: XivApiConfig,
    /// Market data API settings
    #[serde(default)]
    pub universalis: UniversalisConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Where fetched recipes are cached between runs
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// Where the spreadsheet is written
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            xivapi: XivApiConfig::default(),
            universalis: UniversalisConfig::default(),
            timeout: default_timeout(),
            cache_path: default_cache_path(),
            output_path: default_output_path(),
        }
    }
}

/// Configuration for the recipe search API
#[derive(Debug, Deserialize, Clone)]
pub struct XivApiConfig {
    #[serde(default = "default_xivapi_url")]
    pub base_url: String,
    /// Private key appended to every request when set
    pub private_key: Option<String>,
    /// Search string matched against recipe names
    #[serde(default = "default_search_filter")]
    pub search_filter: String,
}

impl Default for XivApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_xivapi_url(),
            private_key: None,
            search_filter: default_search_filter(),
        }
    }
}

/// What to do when the market has nothing for a requested item
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingPricePolicy {
    /// Price the item at 0 and log a warning
    #[default]
    Zero,
    /// Abort the run
    Fail,
}

/// Configuration for the market data API
#[derive(Debug, Deserialize, Clone)]
pub struct UniversalisConfig {
    #[serde(default = "default_universalis_url")]
    pub base_url: String,
    /// World or data center ingredient prices are read from
    #[serde(default = "default_ingredient_scope")]
    pub ingredient_scope: String,
    /// World or data center sell prices are read from
    #[serde(default = "default_item_scope")]
    pub item_scope: String,
    /// Number of listings requested per ingredient
    #[serde(default = "default_ingredient_listings")]
    pub ingredient_listings: u32,
    /// A listing counts as a bulk listing when its quantity exceeds this
    #[serde(default = "default_bulk_quantity")]
    pub bulk_quantity: u32,
    #[serde(default)]
    pub missing_price: MissingPricePolicy,
}

impl Default for UniversalisConfig {
    fn default() -> Self {
        Self {
            base_url: default_universalis_url(),
            ingredient_scope: default_ingredient_scope(),
            item_scope: default_item_scope(),
            ingredient_listings: default_ingredient_listings(),
            bulk_quantity: default_bulk_quantity(),
            missing_price: MissingPricePolicy::default(),
        }
    }
}

// Default value functions
fn default_timeout() -> u64 {
    30
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("recipes.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("recipes.xlsx")
}

fn default_xivapi_url() -> String {
    "https://xivapi.com".to_string()
}

fn default_search_filter() -> String {
    "Diadochos *".to_string()
}

fn default_universalis_url() -> String {
    "https://universalis.app".to_string()
}

fn default_ingredient_scope() -> String {
    "Chaos".to_string()
}

fn default_item_scope() -> String {
    "Omega".to_string()
}

fn default_ingredient_listings() -> u32 {
    10
}

fn default_bulk_quantity() -> u32 {
    30
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with CRAFT_MARGIN__ prefix
    /// 2. The given config file, or craft-margin.toml in the current directory
    /// 3. Default values
    ///
    /// Environment variable format: CRAFT_MARGIN__XIVAPI__PRIVATE_KEY
    pub fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name("craft-margin").required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("CRAFT_MARGIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
