//! Configuration module for cypherlink
//!
//! Connection settings can be loaded from a TOML file and/or environment
//! variables. See [`Config::load`] for the precedence rules.

mod defaults;
mod loading;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.cypherlink/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".cypherlink").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// Settings used to open a connection to the graph database
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Hostname or IP address of the database server
    #[serde(default = "default_host")]
    pub host: String,

    /// Bolt port of the database server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Username, empty when authentication is disabled
    #[serde(default)]
    pub username: String,

    /// Password, empty when authentication is disabled
    #[serde(default)]
    pub password: String,

    /// Whether to require TLS on the Bolt connection
    #[serde(default)]
    pub encrypted: bool,

    /// Name this client logs itself under
    ///
    /// Local only: the Bolt driver sends its own fixed user agent, so the
    /// server never sees this value.
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Database to run statements against; the server default when unset
    #[serde(default)]
    pub database: Option<String>,

    /// Number of records pulled per round-trip while streaming results
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field(
                "password",
                &if self.password.is_empty() {
                    ""
                } else {
                    "***REDACTED***"
                },
            )
            .field("encrypted", &self.encrypted)
            .field("client_name", &self.client_name)
            .field("database", &self.database)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

impl ConnectionConfig {
    /// Creates a connection config for the given address with default settings
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Bolt URI for this connection
    pub fn uri(&self) -> String {
        let scheme = if self.encrypted { "bolt+s" } else { "bolt" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl ConnectionConfig {
    /// Validates the connection settings
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("connection.host must not be empty"));
        }

        if self.port == 0 {
            return Err(Error::config("connection.port must be greater than 0"));
        }

        if self.fetch_size == 0 {
            return Err(Error::config(
                "connection.fetch_size must be greater than 0",
            ));
        }

        if let Some(database) = &self.database {
            if database.trim().is_empty() {
                return Err(Error::config(
                    "connection.database must not be empty when set",
                ));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()
    }
}
