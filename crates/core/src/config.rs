//! Application configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file under
//! the user's config directory, then `TCG_TRADE__*` environment variables
//! (e.g. `TCG_TRADE__CATALOG__API_KEY`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Directory under `~/.config` holding the configuration file.
pub const CONFIG_DIR: &str = "tcg-trade";
/// Name of the configuration file.
pub const CONFIG_FILE: &str = "config.toml";
/// Public catalog endpoint used when no override is configured.
pub const DEFAULT_CATALOG_URL: &str = "https://api.pokemontcg.io/v2";

const DEFAULT_CONFIG: &str = r#"# tcg-trade configuration

# Directory where the collection and trade listings are stored.
# data_dir = "/home/me/.local/share/tcg-trade"

[catalog]
base_url = "https://api.pokemontcg.io/v2"
# api_key = "..."
timeout_secs = 15
card_page_size = 20
set_card_page_size = 50
set_page_size = 250
"#;

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Root of the JSON key-value store.
    pub data_dir: PathBuf,
    /// Directory receiving the log file.
    pub log_dir: PathBuf,
    /// Catalog client settings.
    pub catalog: CatalogConfig,
}

/// Settings for the third-party card catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Optional `X-Api-Key` value; the API works without one at lower rate limits.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Page size for free-text card searches.
    pub card_page_size: u32,
    /// Page size when listing the cards of one set.
    pub set_card_page_size: u32,
    /// Page size for set searches.
    pub set_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            api_key: None,
            timeout_secs: 15,
            card_page_size: 20,
            set_card_page_size: 50,
            set_page_size: 250,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path`; a missing file falls back to defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR);
        let catalog = CatalogConfig::default();

        let settings = Config::builder()
            .set_default("data_dir", data_root.to_string_lossy().to_string())?
            .set_default("log_dir", data_root.join("logs").to_string_lossy().to_string())?
            .set_default("catalog.base_url", catalog.base_url)?
            .set_default("catalog.timeout_secs", catalog.timeout_secs as i64)?
            .set_default("catalog.card_page_size", i64::from(catalog.card_page_size))?
            .set_default("catalog.set_card_page_size", i64::from(catalog.set_card_page_size))?
            .set_default("catalog.set_page_size", i64::from(catalog.set_page_size))?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("TCG_TRADE").separator("__"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.catalog.base_url = config.catalog.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}

/// Default configuration file path.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a commented default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.catalog.card_page_size, 20);
        assert!(config.catalog.api_key.is_none());
        Ok(())
    }

    #[test]
    fn file_overrides_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"data_dir = "/tmp/cards"

[catalog]
base_url = "http://localhost:9000/v2/"
api_key = "secret"
set_page_size = 10
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cards"));
        assert_eq!(config.catalog.base_url, "http://localhost:9000/v2");
        assert_eq!(config.catalog.api_key.as_deref(), Some("secret"));
        assert_eq!(config.catalog.set_page_size, 10);
        assert_eq!(config.catalog.timeout_secs, 15);
        Ok(())
    }

    #[test]
    fn default_file_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        write_default_config(&path)?;
        assert!(path.exists());

        fs::write(&path, "[catalog]\ntimeout_secs = 3\n")?;
        write_default_config(&path)?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.catalog.timeout_secs, 3);
        Ok(())
    }
}
