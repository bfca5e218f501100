//! # Terminal Configuration
//!
//! Configuration for the `till` terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILL_DATA_DIR=/srv/till/data                                       │
//! │     TILL_STORE_NAME="Hardware Depot"                                   │
//! │     TILL_CURRENCY_SYMBOL=€                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/till/config.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.till.pos/config.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     data directory under the platform data dir, stock file names      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # config.toml
//! [store]
//! name = "Hardware Depot"
//! currency_symbol = "$"
//!
//! [data]
//! dir = "/srv/till/data"
//! products_file = "products.json"
//! sales_file = "sales.json"
//! returns_file = "returns.json"
//! ```

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use till_store::store::{DEFAULT_PRODUCTS_FILE, DEFAULT_RETURNS_FILE, DEFAULT_SALES_FILE};
use till_store::StoreConfig;
use tracing::{debug, info, warn};

// =============================================================================
// Errors
// =============================================================================

/// Configuration load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// Store identity and display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Shown in the startup banner and on receipts.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Currency symbol (for display only; amounts are always cents).
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Till Hardware".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Where the JSON stores live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSettings {
    /// Data directory. Unset means the platform data directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_products_file")]
    pub products_file: String,

    #[serde(default = "default_sales_file")]
    pub sales_file: String,

    #[serde(default = "default_returns_file")]
    pub returns_file: String,
}

fn default_products_file() -> String {
    DEFAULT_PRODUCTS_FILE.to_string()
}

fn default_sales_file() -> String {
    DEFAULT_SALES_FILE.to_string()
}

fn default_returns_file() -> String {
    DEFAULT_RETURNS_FILE.to_string()
}

impl Default for DataSettings {
    fn default() -> Self {
        DataSettings {
            dir: None,
            products_file: default_products_file(),
            sales_file: default_sales_file(),
            returns_file: default_returns_file(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name must not be empty".into()));
        }

        let files = [
            ("products_file", &self.data.products_file),
            ("sales_file", &self.data.sales_file),
            ("returns_file", &self.data.returns_file),
        ];
        for (key, name) in files {
            if name.trim().is_empty() || name.contains('/') || name.contains('\\') {
                return Err(ConfigError::Invalid(format!(
                    "data.{} must be a plain file name, got '{}'",
                    key, name
                )));
            }
        }

        let names = [
            &self.data.products_file,
            &self.data.sales_file,
            &self.data.returns_file,
        ];
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(ConfigError::Invalid(
                "data file names must all differ".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("TILL_DATA_DIR") {
            debug!(dir = %dir, "Overriding data directory from environment");
            self.data.dir = Some(PathBuf::from(dir));
        }

        if let Some(name) = lookup("TILL_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(symbol) = lookup("TILL_CURRENCY_SYMBOL") {
            self.store.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "till", "pos").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Data directory: configured, else the platform data dir, else `./data`.
    pub fn data_dir(&self) -> PathBuf {
        self.data
            .dir
            .clone()
            .or_else(|| ProjectDirs::from("com", "till", "pos").map(|d| d.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Store layer configuration for the resolved data directory.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.data_dir())
            .products_file(&self.data.products_file)
            .sales_file(&self.data.sales_file)
            .returns_file(&self.data.returns_file)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use till_terminal::config::AppConfig;
    ///
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.store.currency_symbol,
            (cents / 100).abs(),
            (cents % 100).abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.data.products_file, "products.json");
        assert_eq!(config.store.currency_symbol, "$");
    }

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(1234), "$12.34");
        assert_eq!(config.format_currency(1), "$0.01");
        assert_eq!(config.format_currency(0), "$0.00");
        assert_eq!(config.format_currency(-1234), "-$12.34");
        assert_eq!(config.format_currency(123456789), "$1234567.89");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.store.name = "  ".to_string();
        assert!(config.validate().is_err());

        config.store.name = "Depot".to_string();
        config.data.sales_file = "../sales.json".to_string();
        assert!(config.validate().is_err());

        config.data.sales_file = "products.json".to_string();
        assert!(config.validate().is_err());

        config.data.sales_file = "sales.json".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TILL_DATA_DIR", "/srv/till"),
            ("TILL_CURRENCY_SYMBOL", "€"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.data_dir(), PathBuf::from("/srv/till"));
        assert_eq!(config.format_currency(250), "€2.50");
        assert_eq!(config.store.name, "Till Hardware");
        assert_eq!(
            config.store_config().sales_path(),
            PathBuf::from("/srv/till/sales.json")
        );
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("config.toml");

        let mut config = AppConfig::default();
        config.store.name = "Corner Hardware".to_string();
        config.data.dir = Some(dir.path().join("data"));
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[store]"));
        assert!(text.contains("[data]"));

        let loaded: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig = toml::from_str("[store]\nname = \"Depot\"\n").unwrap();
        assert_eq!(config.store.name, "Depot");
        assert_eq!(config.store.currency_symbol, "$");
        assert_eq!(config.data, DataSettings::default());
    }
}
