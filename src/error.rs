use thiserror::Error;

/// Errors that can occur while loading recipes, resolving prices or writing the workbook
#[derive(Error, Debug)]
pub enum CraftError {
    /// Transport failure or non-success status from a remote data source
    #[error("Request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("Unexpected response from {url}: {source}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A present ingredient slot had no usable amount
    #[error("Ingredient slot {slot} of {url} has no amount")]
    MissingAmount { url: String, slot: usize },

    /// The market response had no entry for a requested item
    #[error("No market data for item {0}")]
    MissingPrice(String),

    /// The market response had an entry for the item but no listings
    #[error("No listings for item {0}")]
    NoListings(String),

    /// Failed to read or write a local file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The recipe cache could not be (de)serialized
    #[error("Recipe cache error: {0}")]
    CacheError(#[from] serde_json::Error),

    /// More rows or columns than a worksheet holds
    #[error("Too many {what} for one worksheet: {count}")]
    LayoutTooLarge { what: &'static str, count: usize },

    /// The spreadsheet writer failed
    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, CraftError>;
