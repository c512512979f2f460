//! cypherlink CLI - run Cypher against Memgraph from the shell
//!
//! Connection settings come from `~/.cypherlink/config.toml` (or `--config`)
//! and the environment; see `cypherlink_core::Config::load`.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cypherlink_client::MemgraphClient;
use cypherlink_core::config::Config;
use cypherlink_core::Constraint;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "cypherlink")]
#[command(about = "Run Cypher statements against a Memgraph database")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a statement and discard its results
    Run {
        /// Cypher statement
        statement: String,
    },
    /// Run a statement and print each row as a JSON line
    Fetch {
        /// Cypher statement
        statement: String,
    },
    /// List indexes
    Indexes,
    /// List uniqueness and existence constraints
    Constraints,
    /// List triggers
    Triggers,
    /// Show the storage mode
    StorageMode,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let client = connect(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Run { statement } => {
            client
                .execute(&statement)
                .await
                .context("Statement failed")?;
            info!("Statement completed");
        }
        Commands::Fetch { statement } => fetch(&client, &statement).await?,
        Commands::Indexes => {
            for index in client.get_indexes().await.context("Failed to list indexes")? {
                println!("{}", index.to_cypher()?);
            }
        }
        Commands::Constraints => {
            for constraint in client
                .get_constraints()
                .await
                .context("Failed to list constraints")?
            {
                let kind = match constraint {
                    Constraint::Unique { .. } => "unique",
                    Constraint::Exists { .. } => "exists",
                };
                println!("{kind}\t{}", constraint.to_cypher()?);
            }
        }
        Commands::Triggers => {
            for trigger in client.get_triggers().await.context("Failed to list triggers")? {
                println!("{}\t{}", trigger.name, trigger.to_cypher()?);
            }
        }
        Commands::StorageMode => {
            let mode = client
                .get_storage_mode()
                .await
                .context("Failed to read storage mode")?;
            println!("{mode}");
        }
    }

    Ok(())
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cypherlink_client={level},cypherlink_core={level},{}={level}",
            env!("CARGO_PKG_NAME")
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn connect(config_path: Option<&Path>) -> Result<MemgraphClient> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    debug!("Using {:?}", config.connection);

    let address = config.connection.uri();
    MemgraphClient::connect(config.connection)
        .await
        .with_context(|| format!("Failed to connect to {address}"))
}

async fn fetch(client: &MemgraphClient, statement: &str) -> Result<()> {
    let mut results = client
        .execute_and_fetch(statement)
        .await
        .context("Statement failed")?;

    let mut count = 0usize;
    while let Some(row) = results.next().await.context("Failed while reading results")? {
        println!("{}", serde_json::to_string(&row)?);
        count += 1;
    }
    debug!("Fetched {} rows", count);
    Ok(())
}
