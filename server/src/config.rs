//! Layered server configuration using figment.
//!
//! Sources, highest priority first:
//! 1. `TODO_*` environment variables (`__` separates sections, so
//!    `TODO_STORAGE__BACKEND=sqlite` sets `storage.backend`)
//! 2. `PORT`
//! 3. the TOML file named by `TODO_CONFIG` (default `todo-server.toml`), if present
//! 4. built-in defaults

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "todo-server.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sqlite,
}

fn default_database_url() -> String {
    "sqlite://todos.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Only read by the sqlite backend.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API from a browser. Empty disables CORS.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let path = std::env::var("TODO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::raw().only(&["PORT"]))
            .merge(Env::prefixed("TODO_").ignore(&["CONFIG", "LOG"]).split("__"))
    }

    /// `host:port`, resolved by the listener at bind time.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.bind_addr(), "localhost:3000");
    }

    #[test]
    fn defaults_are_correct() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.max_connections, 5);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn loads_defaults_without_sources() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.port, 3000);
            assert_eq!(config.storage.database_url, "sqlite://todos.db");
            Ok(())
        });
    }

    #[test]
    fn toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "todo-server.toml",
                r#"
                port = 4000

                [storage]
                backend = "sqlite"
                database_url = "sqlite://other.db"
                "#,
            )?;
            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.port, 4000);
            assert_eq!(config.storage.backend, StorageBackend::Sqlite);
            assert_eq!(config.storage.database_url, "sqlite://other.db");
            Ok(())
        });
    }

    #[test]
    fn config_path_comes_from_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("custom.toml", "port = 4100")?;
            jail.set_env("TODO_CONFIG", "custom.toml");
            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.port, 4100);
            Ok(())
        });
    }

    #[test]
    fn prefixed_env_beats_port_and_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("todo-server.toml", "port = 4000")?;
            jail.set_env("PORT", "5000");
            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.port, 5000);

            jail.set_env("TODO_PORT", "6000");
            jail.set_env("TODO_STORAGE__BACKEND", "sqlite");
            let config = ServerConfig::load().expect("config loads");
            assert_eq!(config.port, 6000);
            assert_eq!(config.storage.backend, StorageBackend::Sqlite);
            Ok(())
        });
    }

    #[test]
    fn rejects_blank_host_and_zero_connections() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("todo-server.toml", r#"host = "  ""#)?;
            assert!(matches!(
                ServerConfig::load(),
                Err(ConfigError::InvalidValue { .. })
            ));
            Ok(())
        });
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("TODO_STORAGE__MAX_CONNECTIONS", "0");
            assert!(matches!(
                ServerConfig::load(),
                Err(ConfigError::InvalidValue { .. })
            ));
            Ok(())
        });
    }
}
