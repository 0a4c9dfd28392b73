//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `sceneguard.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

use sceneguard_adapter_inventory_fs::InventoryConfig;
use sceneguard_app::config::ValidatorConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Scene inventory and entity registry locations.
    pub inventory: InventoryConfig,
    /// Simulated hub.
    #[serde(rename = "virtual")]
    pub virtual_hub: VirtualConfig,
    /// Gates, delays and tolerances of the validator.
    pub validator: ValidatorConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Virtual hub seeding and simulated faults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Create virtual lights for every inventory scene at startup.
    pub enabled: bool,
    /// Entities that ignore scene recalls.
    pub stuck_entities: Vec<String>,
    /// Entities whose colour temperature lands off target every other change.
    pub slow_color_temp_entities: Vec<String>,
}

impl Config {
    /// Load configuration from `sceneguard.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is out of bounds.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("sceneguard.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SCENEGUARD_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("SCENEGUARD_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("SCENEGUARD_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("SCENEGUARD_INVENTORY_DIR") {
            self.inventory.dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("SCENEGUARD_REGISTRY") {
            self.inventory.registry_path = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("SCENEGUARD_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.inventory.platform.trim().is_empty() {
            return Err(ConfigError::Validation(
                "inventory.platform must not be empty".to_string(),
            ));
        }
        self.validator
            .validate()
            .map_err(|err| ConfigError::Validation(format!("validator: {err}")))
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sceneguardd=info,sceneguard=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stuck_entities: Vec::new(),
            slow_color_temp_entities: Vec::new(),
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
