use async_trait::async_trait;
use cypherlink_core::{ConnectionConfig, Error, Result, Row};
use futures::stream::{Stream, TryStreamExt};
use neo4rs::{ConfigBuilder, Graph, Query};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use super::convert::{build_query, is_connection_error, map_error, row_from_neo4rs};
use crate::transport::{Params, RowCursor, Transport};

/// Transport speaking Bolt to a Memgraph (or any Bolt-compatible) server
pub struct Neo4jTransport {
    graph: Graph,
    uri: String,
    active: AtomicBool,
}

impl Neo4jTransport {
    /// Connect to the server described by `config`
    ///
    /// # Example
    /// ```no_run
    /// use cypherlink_client::Neo4jTransport;
    /// use cypherlink_core::ConnectionConfig;
    ///
    /// # async fn example() -> cypherlink_core::Result<()> {
    /// let transport = Neo4jTransport::connect(&ConnectionConfig::default()).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let uri = config.uri();

        info!("Connecting to Memgraph at {} as '{}'", uri, config.client_name);

        let mut builder = ConfigBuilder::default()
            .uri(uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .fetch_size(config.fetch_size);
        if let Some(database) = &config.database {
            builder = builder.db(database.as_str());
        }
        let driver_config = builder
            .build()
            .map_err(|e| Error::connection(format!("Invalid connection settings: {e}")))?;

        let graph = Graph::connect(driver_config)
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to {uri}: {e}")))?;

        // The driver pools lazily, so probe once to surface bad addresses and credentials now
        graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map_err(|e| Error::connection(format!("Failed to connect to {uri}: {e}")))?;

        Ok(Self {
            graph,
            uri,
            active: AtomicBool::new(true),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn record_failure(&self, err: neo4rs::Error) -> Error {
        if is_connection_error(&err) {
            self.active.store(false, Ordering::Relaxed);
        }
        map_error(err)
    }
}

#[async_trait]
impl Transport for Neo4jTransport {
    async fn execute(&self, statement: &str, params: &Params) -> Result<()> {
        let query = build_query(statement, params)?;
        self.graph
            .run(query)
            .await
            .map_err(|e| self.record_failure(e))?;
        self.active.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn execute_and_fetch(
        &self,
        statement: &str,
        params: &Params,
    ) -> Result<Box<dyn RowCursor>> {
        let query = build_query(statement, params)?;
        let stream = self
            .graph
            .execute(query)
            .await
            .map_err(|e| self.record_failure(e))?;
        self.active.store(true, Ordering::Relaxed);
        debug!("Opened result stream on {}", self.uri);
        Ok(Box::new(Neo4jCursor {
            rows: Box::pin(TryStreamExt::into_stream(stream.into_stream())),
        }))
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

type BoltRows =
    Pin<Box<dyn Stream<Item = std::result::Result<neo4rs::Row, neo4rs::Error>> + Send>>;

struct Neo4jCursor {
    rows: BoltRows,
}

#[async_trait]
impl RowCursor for Neo4jCursor {
    async fn next_row(&mut self) -> Result<Option<Row>> {
        match self.rows.try_next().await.map_err(map_error)? {
            Some(row) => Ok(Some(row_from_neo4rs(&row)?)),
            None => Ok(None),
        }
    }
}
