//! Test utilities for client integration tests

use cypherlink_client::{Connection, MemgraphClient, MockTransport};
use cypherlink_core::{ConnectionConfig, Row, Value};

/// A connection backed by a mock, plus a handle to inspect the mock
#[allow(dead_code)]
pub fn mock_connection() -> (Connection, MockTransport) {
    let mock = MockTransport::new();
    let connection = Connection::with_transport(ConnectionConfig::default(), mock.clone());
    (connection, mock)
}

#[allow(dead_code)]
pub fn mock_client() -> (MemgraphClient, MockTransport) {
    let (connection, mock) = mock_connection();
    (MemgraphClient::new(connection), mock)
}

/// Build a row from (column, value) pairs
#[allow(dead_code)]
pub fn row<const N: usize>(columns: [(&str, Value); N]) -> Row {
    columns.into_iter().collect()
}

/// Connection settings for a locally running Memgraph
///
/// Honors the usual `MG_*` environment variables.
#[allow(dead_code)]
pub fn live_config() -> ConnectionConfig {
    cypherlink_core::Config::load(None)
        .map(|config| config.connection)
        .unwrap_or_default()
}
