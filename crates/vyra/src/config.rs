//! Configuration management for vyra.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "vyra";

/// File holding the trusted contacts.
pub const CONTACTS_FILE_NAME: &str = "contacts.json";

/// File holding the alert history.
pub const ALERTS_FILE_NAME: &str = "alerts.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. The `PORT` environment variable (mapped to `server.port`)
/// 2. Environment variables prefixed with `VYRA_`, nested with `__`
/// 3. TOML config file at `~/.config/vyra/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON documents.
    /// Defaults to `~/.local/share/vyra`
    pub data_dir: Option<PathBuf>,
    /// Maximum number of trusted contacts.
    pub max_contacts: usize,
    /// Number of most recent alerts kept.
    pub max_alerts: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_contacts: 3,
            max_alerts: 100,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// Build the layered figment for the given config file.
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed("VYRA_").split("__"))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
    }

    /// Extract and validate a configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host cannot be empty".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.storage.max_contacts == 0 {
            return Err(Error::ConfigValidation {
                message: "storage.max_contacts must be greater than 0".to_string(),
            });
        }

        if self.storage.max_alerts == 0 {
            return Err(Error::ConfigValidation {
                message: "storage.max_alerts must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the contacts document path.
    #[must_use]
    pub fn contacts_path(&self) -> PathBuf {
        self.data_dir().join(CONTACTS_FILE_NAME)
    }

    /// Get the alerts document path.
    #[must_use]
    pub fn alerts_path(&self) -> PathBuf {
        self.data_dir().join(ALERTS_FILE_NAME)
    }

    /// Get the `host:port` string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.storage.max_contacts, 3);
        assert_eq!(config.storage.max_alerts, 100);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port"));
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.server.host = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.host"));
    }

    #[test]
    fn test_validate_zero_limits() {
        let mut config = Config::default();
        config.storage.max_contacts = 0;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_contacts"));

        let mut config = Config::default();
        config.storage.max_alerts = 0;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_alerts"));
    }

    #[test]
    fn test_document_paths() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/vyra"));

        assert_eq!(config.data_dir(), PathBuf::from("/srv/vyra"));
        assert_eq!(
            config.contacts_path(),
            PathBuf::from("/srv/vyra/contacts.json")
        );
        assert_eq!(config.alerts_path(), PathBuf::from("/srv/vyra/alerts.json"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("vyra"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("vyra"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_bind_address() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_load_nonexistent_config() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .expect("defaults should load");
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_port_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [server]
                port = 8080
                host = "127.0.0.1"
                "#,
            )?;
            jail.clear_env();
            jail.set_env("PORT", "9090");

            let config = Config::load_from(Some(PathBuf::from("config.toml")))
                .expect("config should load");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_nesting() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("VYRA_STORAGE__DATA_DIR", "/tmp/vyra-data");
            jail.set_env("VYRA_STORAGE__MAX_ALERTS", "10");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .expect("config should load");
            assert_eq!(config.data_dir(), PathBuf::from("/tmp/vyra-data"));
            assert_eq!(config.storage.max_alerts, 10);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_port_env_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PORT", "not-a-port");
            assert!(Config::load_from(Some(PathBuf::from("missing.toml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"max_contacts": 5}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.max_contacts, 5);
        assert_eq!(storage.max_alerts, 100);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("max_contacts"));
        assert!(json.contains("port"));
    }
}
