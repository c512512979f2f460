//! Tests for configuration module

use super::*;
use crate::error::{Error, Result};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Loading reads process-wide environment variables
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn create_temp_config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|e| Error::config(format!("Failed to create temp file: {e}")))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::config(format!("Failed to write temp file: {e}")))?;
    file.flush()
        .map_err(|e| Error::config(format!("Failed to flush temp file: {e}")))?;
    Ok(file)
}

fn with_env_var<F, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    std::env::set_var(key, value);
    let result = f();
    std::env::remove_var(key);
    result
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.connection.host, "127.0.0.1");
    assert_eq!(config.connection.port, 7687);
    assert!(config.connection.username.is_empty());
    assert!(!config.connection.encrypted);
    assert_eq!(config.connection.client_name, "cypherlink");
    assert_eq!(config.connection.database, None);
    assert_eq!(config.connection.fetch_size, 200);
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_valid() {
    let toml = r#"
        [connection]
        host = "graph.internal"
        port = 7688
        username = "admin"
        password = "secret"
        encrypted = true
        database = "movies"
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse valid TOML");
    assert_eq!(config.connection.host, "graph.internal");
    assert_eq!(config.connection.port, 7688);
    assert_eq!(config.connection.username, "admin");
    assert!(config.connection.encrypted);
    assert_eq!(config.connection.database.as_deref(), Some("movies"));
    assert_eq!(config.connection.fetch_size, 200);
}

#[test]
fn test_from_toml_str_empty_uses_defaults() {
    let config = Config::from_toml_str("").expect("Failed to parse empty TOML");
    assert_eq!(config.connection.host, "127.0.0.1");
    assert_eq!(config.connection.port, 7687);
}

#[test]
fn test_from_toml_str_invalid() {
    let result = Config::from_toml_str("[connection\nhost = ");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_validate_rejects_empty_host() {
    let mut config = Config::default();
    config.connection.host = "  ".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("connection.host"));
}

#[test]
fn test_validate_rejects_zero_port() {
    let mut config = Config::default();
    config.connection.port = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("connection.port"));
}

#[test]
fn test_validate_rejects_zero_fetch_size() {
    let mut config = Config::default();
    config.connection.fetch_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_blank_database() {
    let mut config = Config::default();
    config.connection.database = Some(String::new());
    assert!(config.validate().is_err());
}

#[test]
fn test_debug_redacts_password() {
    let mut config = ConnectionConfig::new("localhost", 7687);
    config.password = "hunter2".to_string();
    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("REDACTED"));
}

#[test]
fn test_uri_scheme_follows_encryption() {
    let mut config = ConnectionConfig::new("db", 7000);
    assert_eq!(config.uri(), "bolt://db:7000");
    config.encrypted = true;
    assert_eq!(config.uri(), "bolt+s://db:7000");
}

#[test]
fn test_from_file_reads_toml() {
    let _guard = ENV_LOCK.lock().unwrap();
    let file = create_temp_config_file(
        r#"
        [connection]
        host = "from-file"
        port = 9999
    "#,
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.connection.host, "from-file");
    assert_eq!(config.connection.port, 9999);
    assert_eq!(config.connection.client_name, "cypherlink");
}

#[test]
fn test_from_file_missing_file_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    let config = Config::from_file(Path::new("/nonexistent/cypherlink.toml")).unwrap();
    assert_eq!(config.connection.host, "127.0.0.1");
    assert_eq!(config.connection.fetch_size, 200);
}

#[test]
fn test_prefixed_env_overrides_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    let file = create_temp_config_file(
        r#"
        [connection]
        host = "from-file"
    "#,
    )
    .unwrap();

    let config = with_env_var("CYPHERLINK_CONNECTION__HOST", "from-env", || {
        Config::from_file(file.path())
    })
    .unwrap();
    assert_eq!(config.connection.host, "from-env");
}

#[test]
fn test_prefixed_env_parses_numbers() {
    let _guard = ENV_LOCK.lock().unwrap();
    let config = with_env_var("CYPHERLINK_CONNECTION__PORT", "7700", || {
        Config::from_file(Path::new("/nonexistent/cypherlink.toml"))
    })
    .unwrap();
    assert_eq!(config.connection.port, 7700);
}

#[test]
fn test_legacy_env_vars_take_precedence() {
    let _guard = ENV_LOCK.lock().unwrap();
    let config = with_env_var("MG_HOST", "legacy-host", || {
        with_env_var("MG_PORT", "7690", || {
            with_env_var("MG_ENCRYPTED", "True", || {
                Config::from_file(Path::new("/nonexistent/cypherlink.toml"))
            })
        })
    })
    .unwrap();
    assert_eq!(config.connection.host, "legacy-host");
    assert_eq!(config.connection.port, 7690);
    assert!(config.connection.encrypted);
}

#[test]
fn test_invalid_legacy_port_is_ignored() {
    let _guard = ENV_LOCK.lock().unwrap();
    let config = with_env_var("MG_PORT", "not-a-port", || {
        Config::from_file(Path::new("/nonexistent/cypherlink.toml"))
    })
    .unwrap();
    assert_eq!(config.connection.port, 7687);
}
