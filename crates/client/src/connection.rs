use cypherlink_core::{ConnectionConfig, Result};
use tracing::debug;

use crate::neo4j::Neo4jTransport;
use crate::results::ResultStream;
use crate::transport::{Params, Transport};

/// An open session with a graph database
///
/// Methods take `&self` but a connection is meant for one caller at a time;
/// each call completes before the next is issued.
pub struct Connection {
    config: ConnectionConfig,
    transport: Box<dyn Transport>,
}

impl Connection {
    /// Open a Bolt connection described by `config`
    pub async fn connect(config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let transport = Neo4jTransport::connect(&config).await?;
        Ok(Self::with_transport(config, transport))
    }

    /// Wrap an already constructed transport
    pub fn with_transport(config: ConnectionConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    /// Run a statement for its side effects, discarding any rows
    pub async fn execute_query(&self, statement: &str) -> Result<()> {
        self.execute_query_with_params(statement, &Params::new())
            .await
    }

    pub async fn execute_query_with_params(&self, statement: &str, params: &Params) -> Result<()> {
        debug!("Executing: {}", statement);
        self.transport.execute(statement, params).await
    }

    /// Run a statement and stream back its rows
    pub async fn execute_and_fetch(&self, statement: &str) -> Result<ResultStream> {
        self.execute_and_fetch_with_params(statement, &Params::new())
            .await
    }

    pub async fn execute_and_fetch_with_params(
        &self,
        statement: &str,
        params: &Params,
    ) -> Result<ResultStream> {
        debug!("Fetching: {}", statement);
        let cursor = self.transport.execute_and_fetch(statement, params).await?;
        Ok(ResultStream::new(cursor))
    }

    pub fn is_active(&self) -> bool {
        self.transport.is_active()
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("active", &self.is_active())
            .finish()
    }
}
