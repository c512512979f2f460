//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_HOST: &str = "127.0.0.1";
pub(crate) const DEFAULT_PORT: u16 = 7687;
pub(crate) const DEFAULT_CLIENT_NAME: &str = "cypherlink";
pub(crate) const DEFAULT_FETCH_SIZE: usize = 200;

pub(crate) fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_string()
}

pub(crate) fn default_fetch_size() -> usize {
    DEFAULT_FETCH_SIZE
}

impl Default for super::ConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            encrypted: false,
            client_name: default_client_name(),
            database: None,
            fetch_size: default_fetch_size(),
        }
    }
}
