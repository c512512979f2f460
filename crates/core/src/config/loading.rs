//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

type Builder = LibConfigBuilder<config::builder::DefaultState>;

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: Builder,
    key: &str,
    value: T,
) -> Result<Builder> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

/// Helper to override a key from a legacy environment variable, if present
fn override_from_env(builder: Builder, var: &str, key: &str) -> Result<Builder> {
    match std::env::var(var) {
        Ok(value) => builder
            .set_override(key, value)
            .map_err(|e| Error::config(format!("Failed to set {var}: {e}"))),
        Err(_) => Ok(builder),
    }
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `CYPHERLINK_` and use double underscores
    /// for nested values, e.g. `CYPHERLINK_CONNECTION__HOST=db.internal`.
    ///
    /// The `MG_HOST`, `MG_PORT`, `MG_USERNAME`, `MG_PASSWORD`, `MG_ENCRYPTED` and
    /// `MG_CLIENT_NAME` variables are honoured last.
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(builder, "connection.host", default_host())?;
        let builder = set_config_default(builder, "connection.port", default_port() as i64)?;
        let builder = set_config_default(builder, "connection.username", "")?;
        let builder = set_config_default(builder, "connection.password", "")?;
        let builder = set_config_default(builder, "connection.encrypted", false)?;
        let builder =
            set_config_default(builder, "connection.client_name", default_client_name())?;
        let mut builder = set_config_default(
            builder,
            "connection.fetch_size",
            default_fetch_size() as i64,
        )?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("CYPHERLINK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder = override_from_env(builder, "MG_HOST", "connection.host")?;
        if let Ok(port) = std::env::var("MG_PORT") {
            match port.parse::<u16>() {
                Ok(port_num) => {
                    builder = builder
                        .set_override("connection.port", port_num as i64)
                        .map_err(|e| Error::config(format!("Failed to set MG_PORT: {e}")))?;
                }
                Err(_) => {
                    tracing::warn!(value = %port, "Ignoring MG_PORT, not a valid port number");
                }
            }
        }
        builder = override_from_env(builder, "MG_USERNAME", "connection.username")?;
        builder = override_from_env(builder, "MG_PASSWORD", "connection.password")?;
        if let Ok(encrypted) = std::env::var("MG_ENCRYPTED") {
            let flag = matches!(
                encrypted.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
            builder = builder
                .set_override("connection.encrypted", flag)
                .map_err(|e| Error::config(format!("Failed to set MG_ENCRYPTED: {e}")))?;
        }
        builder = override_from_env(builder, "MG_CLIENT_NAME", "connection.client_name")?;

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.cypherlink/config.toml or custom --config path)
    /// 3. Environment variables (CYPHERLINK_*)
    /// 4. Legacy environment variables (MG_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
