mod company;

pub use company::{Company, Config, InvoiceSettings, PdfSettings, StoreSettings};

use crate::error::{CrmError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG config dir, or ~/.solarcrm/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "solarcrm") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        CrmError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".solarcrm"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve a configured directory. Relative paths hang off the config directory.
pub fn resolve_dir(path: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(CrmError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| CrmError::ConfigParse { path, source: e })
}

/// Create the config directory with template files
pub fn init_config_dir(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(CrmError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("data"))?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Spectra Solar Solutions"
tagline = "SOLAR SOLUTIONS"
address = "123 Solar Street, Energy City, EC 12345"
phone = "(555) 123-4567"
email = "info@spectrasolar.com"
support_email = "support@spectrasolar.com"
# tax_id = "GST123456789"    # optional, printed when an invoice has no GST number

[invoice]
currency_symbol = "₹"
footer = "Thank you for choosing Spectra Solar Solutions!"

[store]
backend = "file"             # "file" or "http"
data_dir = "data"            # relative to this directory
# base_url = "https://crm.example.com/api/v1"   # required for backend = "http"
# api_key = "..."                               # sent as a bearer token
timeout_secs = 10

[pdf]
output_dir = "output"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.company.name, "Spectra Solar Solutions");
        assert_eq!(config.store.backend, "file");
        assert_eq!(config.store.base_url, None);
        assert_eq!(config.invoice.currency_symbol, "₹");
    }

    #[test]
    fn relative_dirs_resolve_against_config_dir() {
        let cfg = Path::new("/etc/solarcrm");
        assert_eq!(resolve_dir("data", cfg), PathBuf::from("/etc/solarcrm/data"));
        assert_eq!(resolve_dir("/var/crm", cfg), PathBuf::from("/var/crm"));
    }

    #[test]
    fn store_section_defaults() {
        let settings: StoreSettings = toml::from_str("").unwrap();
        assert_eq!(settings.backend, "file");
        assert_eq!(settings.data_dir, "data");
        assert_eq!(settings.timeout_secs, 10);
    }
}
