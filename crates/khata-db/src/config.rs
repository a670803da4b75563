//! # Khata Configuration
//!
//! Where collections are stored and how the dashboard behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     KHATA_DB_PATH=/srv/khata/khata.db                                   │
//! │     KHATA_STRICT=1                                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     ~/.config/khata/khata.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.khata.khata/khata.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     ./khata.db, keys khata_<module>_v1, 10 rows per page, lenient       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! db_path = "/srv/khata/khata.db"
//! quota_bytes = 5242880   # omit for no limit
//!
//! [keys]
//! app = "khata"
//! version = 1
//!
//! [ui]
//! page_size = 10
//! strictness = "lenient"  # lenient | strict
//! payment_methods = ["cash", "upi", "card"]
//! ```
//!
//! ## Environment Variables
//! | Variable            | Field                 |
//! |---------------------|-----------------------|
//! | `KHATA_DB_PATH`     | `storage.db_path`     |
//! | `KHATA_QUOTA_BYTES` | `storage.quota_bytes` |
//! | `KHATA_APP`         | `keys.app`            |
//! | `KHATA_KEY_VERSION` | `keys.version`        |
//! | `KHATA_PAGE_SIZE`   | `ui.page_size`        |
//! | `KHATA_STRICT`      | `ui.strictness`       |

use std::path::PathBuf;

use khata_core::{KeyNamespace, PaymentMethod, Session, Strictness, DEFAULT_APP, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the collections live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file. Created on first connect.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Byte limit over all stored keys and values. `None` is unlimited.
    #[serde(default)]
    pub quota_bytes: Option<usize>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./khata.db")
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            db_path: default_db_path(),
            quota_bytes: None,
        }
    }
}

// =============================================================================
// Key Settings
// =============================================================================

/// Storage key namespace: keys are `<app>_<module>_v<version>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySettings {
    #[serde(default = "default_app")]
    pub app: String,

    /// Bumped when the stored record shape changes incompatibly.
    #[serde(default = "default_key_version")]
    pub version: u32,
}

fn default_app() -> String {
    DEFAULT_APP.to_string()
}

fn default_key_version() -> u32 {
    1
}

impl Default for KeySettings {
    fn default() -> Self {
        KeySettings {
            app: default_app(),
            version: default_key_version(),
        }
    }
}

// =============================================================================
// UI Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSettings {
    /// Rows per table page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Lenient keeps the dashboard running over bad data; strict surfaces it.
    #[serde(default)]
    pub strictness: Strictness,

    /// Payment methods offered in billing and ledger forms.
    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<PaymentMethod>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_payment_methods() -> Vec<PaymentMethod> {
    PaymentMethod::ALL.to_vec()
}

impl Default for UiSettings {
    fn default() -> Self {
        UiSettings {
            page_size: default_page_size(),
            strictness: Strictness::default(),
            payment_methods: default_payment_methods(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Khata configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KhataConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub keys: KeySettings,

    #[serde(default)]
    pub ui: UiSettings,
}

impl KhataConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (khata.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
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

    /// Loads config or returns the defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> DbResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DbError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Checks values the loaders cannot reject on their own.
    pub fn validate(&self) -> DbResult<()> {
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(DbError::InvalidConfig("storage.db_path must not be empty".into()));
        }
        if self.storage.quota_bytes == Some(0) {
            return Err(DbError::InvalidConfig(
                "storage.quota_bytes must be greater than 0 (omit it for no limit)".into(),
            ));
        }
        if self.ui.page_size == 0 {
            return Err(DbError::InvalidConfig(
                "ui.page_size must be greater than 0".into(),
            ));
        }
        if self.ui.payment_methods.is_empty() {
            return Err(DbError::InvalidConfig(
                "ui.payment_methods must list at least one method".into(),
            ));
        }
        self.namespace()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source. Unparseable values are
    /// logged and ignored.
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("KHATA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.db_path = PathBuf::from(path);
        }

        if let Some(quota) = var("KHATA_QUOTA_BYTES") {
            match quota.parse::<usize>() {
                Ok(0) => self.storage.quota_bytes = None,
                Ok(q) => self.storage.quota_bytes = Some(q),
                Err(_) => warn!(value = %quota, "Invalid KHATA_QUOTA_BYTES in environment"),
            }
        }

        if let Some(app) = var("KHATA_APP") {
            self.keys.app = app;
        }

        if let Some(version) = var("KHATA_KEY_VERSION") {
            match version.parse::<u32>() {
                Ok(v) => self.keys.version = v,
                Err(_) => warn!(value = %version, "Invalid KHATA_KEY_VERSION in environment"),
            }
        }

        if let Some(size) = var("KHATA_PAGE_SIZE") {
            match size.parse::<usize>() {
                Ok(s) => self.ui.page_size = s,
                Err(_) => warn!(value = %size, "Invalid KHATA_PAGE_SIZE in environment"),
            }
        }

        if let Some(strict) = var("KHATA_STRICT") {
            match strict.parse::<Strictness>() {
                Ok(s) => {
                    debug!(strictness = %s, "Overriding strictness from environment");
                    self.ui.strictness = s;
                }
                Err(_) => warn!(value = %strict, "Invalid KHATA_STRICT in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "khata", "khata")
            .map(|dirs| dirs.config_dir().join("khata.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The storage key namespace.
    pub fn namespace(&self) -> DbResult<KeyNamespace> {
        KeyNamespace::new(self.keys.app.clone(), self.keys.version)
            .map_err(|e| DbError::InvalidConfig(format!("keys: {e}")))
    }

    /// Pool settings for the configured database file.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.storage.db_path).quota_bytes(self.storage.quota_bytes)
    }

    /// A fresh UI session with the configured page size and payment methods.
    pub fn session(&self) -> Session {
        Session::new(self.ui.page_size).with_payment_methods(self.ui.payment_methods.clone())
    }

    pub fn strictness(&self) -> Strictness {
        self.ui.strictness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = KhataConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ui.page_size, 10);
        assert_eq!(config.strictness(), Strictness::Lenient);
        assert_eq!(config.namespace().unwrap().key("orders").to_string(), "khata_orders_v1");
        assert_eq!(config.session().payment_methods().len(), PaymentMethod::ALL.len());
    }

    #[test]
    fn test_config_validation() {
        let mut config = KhataConfig::default();

        config.ui.page_size = 0;
        assert!(config.validate().is_err());
        config.ui.page_size = 25;

        config.keys.app = "Khata POS".into();
        assert!(matches!(config.validate(), Err(DbError::InvalidConfig(_))));
        config.keys.app = "shop2".into();

        config.keys.version = 0;
        assert!(config.validate().is_err());
        config.keys.version = 3;

        config.storage.quota_bytes = Some(0);
        assert!(config.validate().is_err());
        config.storage.quota_bytes = Some(1024);

        assert!(config.validate().is_ok());
        assert_eq!(config.namespace().unwrap().key("stock").to_string(), "shop2_stock_v3");
    }

    #[test]
    fn test_overrides() {
        let mut config = KhataConfig::default();
        config.apply_overrides(vars(&[
            ("KHATA_DB_PATH", "/srv/khata.db"),
            ("KHATA_STRICT", "true"),
            ("KHATA_PAGE_SIZE", "25"),
            ("KHATA_KEY_VERSION", "not-a-number"),
            ("KHATA_QUOTA_BYTES", "4096"),
        ]));

        assert_eq!(config.storage.db_path, PathBuf::from("/srv/khata.db"));
        assert_eq!(config.strictness(), Strictness::Strict);
        assert_eq!(config.ui.page_size, 25);
        assert_eq!(config.keys.version, 1);
        assert_eq!(config.storage.quota_bytes, Some(4096));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("khata.toml");

        let mut config = KhataConfig::default();
        config.ui.page_size = 20;
        config.ui.payment_methods = vec![PaymentMethod::Cash, PaymentMethod::Upi];
        config.storage.quota_bytes = Some(5 * 1024 * 1024);
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[storage]"));
        assert!(text.contains("[ui]"));

        let loaded: KhataConfig = toml::from_str(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("khata.toml");
        std::fs::write(&path, "[ui]\nstrictness = \"strict\"\n").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let config: KhataConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.strictness(), Strictness::Strict);
        assert_eq!(config.ui.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.keys, KeySettings::default());
    }

    #[test]
    fn test_bad_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("khata.toml");
        std::fs::write(&path, "[ui]\npage_size = \"many\"\n").unwrap();

        assert!(matches!(
            KhataConfig::load(Some(path.clone())),
            Err(DbError::Config(_))
        ));
        let config = KhataConfig::load_or_default(Some(path));
        assert_eq!(config.ui.page_size, DEFAULT_PAGE_SIZE);
    }
}
