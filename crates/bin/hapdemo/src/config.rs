//! Configuration loading — optional TOML file.
//!
//! Looks for `hapdemo.toml` in the working directory. Every field has a
//! default so the file is optional; without it the daemon exposes
//! `MBP-DEMO` with pairing code `00102003` and stores its state in `./db`.
//! No environment variable is consulted.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use hapdemo_domain::accessory::AccessoryInfo;
use hapdemo_domain::pairing::Pin;

/// Name of the configuration file, relative to the working directory.
pub const CONFIG_FILE: &str = "hapdemo.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exposed accessory.
    pub accessory: AccessoryConfig,
    /// Protocol server settings.
    pub server: ServerConfig,
    /// Persistent store settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Accessory Information published for the switch.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AccessoryConfig {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_revision: String,
}

/// Protocol server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port; `0` picks an ephemeral port.
    pub port: u16,
    /// Pairing code, `XXX-XX-XXX` or 8 plain digits.
    pub pin: String,
    /// Window given to in-flight requests on shutdown.
    pub shutdown_timeout_secs: u64,
}

/// Persistent store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding pairings and the server identity.
    pub path: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `hapdemo.toml` (if present) and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// holds invalid values.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::from_file(CONFIG_FILE)?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.accessory.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "accessory name must not be empty".to_string(),
            ));
        }
        self.pin()?;
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "store path must not be empty".to_string(),
            ));
        }
        EnvFilter::try_new(&self.logging.filter)
            .map_err(|err| ConfigError::Validation(format!("invalid log filter: {err}")))?;
        Ok(())
    }

    /// The configured pairing code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the code is malformed or trivial.
    pub fn pin(&self) -> Result<Pin, ConfigError> {
        Pin::parse(&self.server.pin)
            .map_err(|err| ConfigError::Validation(format!("invalid pin: {err}")))
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Accessory Information for the exposed switch.
    #[must_use]
    pub fn accessory_info(&self) -> AccessoryInfo {
        AccessoryInfo {
            name: self.accessory.name.clone(),
            manufacturer: self.accessory.manufacturer.clone(),
            model: self.accessory.model.clone(),
            serial_number: self.accessory.serial_number.clone(),
            firmware_revision: self.accessory.firmware_revision.clone(),
        }
    }
}

impl Default for AccessoryConfig {
    fn default() -> Self {
        let info = AccessoryInfo::default();
        Self {
            name: "MBP-DEMO".to_string(),
            manufacturer: info.manufacturer,
            model: info.model,
            serial_number: info.serial_number,
            firmware_revision: info.firmware_revision,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 51826,
            pin: "00102003".to_string(),
            shutdown_timeout_secs: 5,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_produce_demo_defaults() {
        let config = Config::default();
        assert_eq!(config.accessory.name, "MBP-DEMO");
        assert_eq!(config.server.pin, "00102003");
        assert_eq!(config.server.port, 51826);
        assert_eq!(config.store.path, PathBuf::from("./db"));
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 51826);
        assert_eq!(config.accessory.name, "MBP-DEMO");
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [accessory]
            name = 'Desk Lamp'
            manufacturer = 'acme'
            model = 'L1'
            serial_number = 'SN-1'
            firmware_revision = '2.0.0'

            [server]
            host = '127.0.0.1'
            port = 9090
            pin = '031-45-154'
            shutdown_timeout_secs = 1

            [store]
            path = '/var/lib/hapdemo'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.accessory_info().name, "Desk Lamp");
        assert_eq!(config.accessory_info().firmware_revision, "2.0.0");
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.pin().unwrap().as_digits(), "03145154");
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(1));
        assert_eq!(config.store.path, PathBuf::from("/var/lib/hapdemo"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.server.port, 51826);
    }

    #[test]
    fn should_accept_ephemeral_port() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_empty_name() {
        let mut config = Config::default();
        config.accessory.name = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_invalid_pin() {
        let mut config = Config::default();
        config.server.pin = "1234".to_string();
        assert!(config.validate().is_err());
        config.server.pin = "111-11-111".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_invalid_log_filter() {
        let mut config = Config::default();
        config.logging.filter = "hapdemo=loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "invalid {{{").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
