//! Layered configuration for the service binary.
//!
//! Sources, highest priority first:
//! 1. Environment variables with the `CAREVISIT_` prefix, `__` separating
//!    sections (`CAREVISIT_HTTP__PORT` → `http.port`)
//! 2. The TOML file named by `CAREVISIT_CONFIG`, or `carevisit.toml`
//! 3. Built-in defaults

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the TOML file to load.
pub const CONFIG_PATH_ENV: &str = "CAREVISIT_CONFIG";
/// TOML file loaded when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "carevisit.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not match the expected shape.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
    /// A value parsed but is not usable.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted key of the offending value.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface to bind.
    pub bind: String,
    /// TCP port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: 8080,
        }
    }
}

impl HttpConfig {
    /// Returns `bind:port` for the listener.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/carevisit".to_owned(),
            pool_size: 10,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is
    /// unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "carevisit=info,tower_http=info".to_owned(),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener.
    #[serde(default)]
    pub http: HttpConfig,
    /// Database pool.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Loads and validates configuration from every source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source is malformed, or
    /// [`ConfigError::InvalidValue`] when a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider chain without extracting it.
    #[must_use]
    pub fn figment() -> Figment {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CAREVISIT_").ignore(&["config"]).split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.pool_size",
                reason: "must be at least 1",
            });
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}
