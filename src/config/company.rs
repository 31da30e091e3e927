use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    pub invoice: InvoiceSettings,
    pub store: StoreSettings,
    pub pdf: PdfSettings,
}

/// Company profile printed on every invoice.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub support_email: String,
    /// Default GST/tax number, used when an invoice carries none of its own
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub currency_symbol: String,
    pub footer: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreSettings {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}

fn default_backend() -> String {
    "file".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}
