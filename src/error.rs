use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrmError {
    #[error("Config directory not found at {0}. Run 'solarcrm init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Store backend 'http' requires [store] base_url in config.toml")]
    MissingBaseUrl,

    #[error("Unknown store backend '{0}'. Use 'file' or 'http'.")]
    UnknownBackend(String),

    #[error("Record '{id}' not found in {collection}")]
    RecordNotFound { collection: String, id: String },

    #[error("Failed to decode {collection} data: {reason}")]
    CorruptCollection { collection: String, reason: String },

    #[error("Store request failed: {0}")]
    Http(String),

    #[error("Customer '{0}' not found")]
    CustomerNotFound(String),

    #[error("Product '{0}' not found")]
    ProductNotFound(String),

    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid {field} '{value}'. Expected one of: {expected}")]
    InvalidVariant {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{0} must not be negative")]
    NegativeValue(&'static str),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid quantity '{qty}' for item '{item}': {reason}")]
    InvalidQuantity {
        item: String,
        qty: String,
        reason: String,
    },

    #[error("Invalid item format '{0}'. Expected 'product:quantity' (e.g., 'panel-450w:12')")]
    InvalidItemFormat(String),

    #[error("Invalid custom item '{0}'. Expected 'name:quantity:unit_cost' (e.g., 'Wiring:1:2500')")]
    InvalidCustomItem(String),

    #[error("No items specified. Use --item <product>:<quantity> or --custom <name>:<qty>:<cost>.")]
    NoItems,

    #[error("Unknown collection '{0}'. Use customers, products, tasks or invoices.")]
    UnknownCollection(String),

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for CrmError {
    fn from(err: ureq::Error) -> Self {
        CrmError::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;
