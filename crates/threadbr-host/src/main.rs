//! Demo host for the threadbr stack.
//!
//! Connects to a TCP-bridged RCP serial port, seeds an in-memory record
//! store from a YAML configuration file, attaches the configured network,
//! and runs the coordinator until interrupted.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use threadbr_client::{ClientError, RcpLink, SpinelClient};
use threadbr_common::MemoryStore;
use threadbr_coordinator::{Coordinator, CoordinatorConfig, CoordinatorError};

use crate::config::HostConfig;

/// Errors surfaced to the operator.
#[derive(Debug, Error)]
pub enum HostError {
    /// Filesystem or socket failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file did not parse.
    #[error("could not parse {path}: {source}")]
    Config {
        /// Path of the offending file.
        path: String,
        /// Underlying parse error.
        source: serde_yaml::Error,
    },

    /// A configuration field held a malformed value.
    #[error("bad {field} in configuration: {reason}")]
    Field {
        /// Field name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The RCP client failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The coordinator failed.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}

#[derive(Debug, Parser)]
#[command(name = "threadbr", about = "Thread border router host demo")]
struct Args {
    /// Host configuration file.
    #[arg(short, long, default_value = "threadbr.yaml")]
    config: PathBuf,

    /// Log filter, overriding RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let filter = match &args.log {
        Some(spec) => EnvFilter::new(spec),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(args).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), HostError> {
    let config = HostConfig::load(&args.config)?;
    let network = config.network.to_record()?;
    let network_id = network.id.clone();

    let store = Arc::new(MemoryStore::new());
    store.insert_network(network);
    let now = Utc::now();
    for joiner in &config.joiners {
        store.insert_joiner(joiner.to_record(&network_id, now)?);
    }

    info!(addr = %config.rcp_addr, "connecting to RCP");
    let link = RcpLink::connect_tcp(&config.rcp_addr).await?;
    let client = SpinelClient::spawn(link);

    let ack = client.reset().await?;
    info!(ack = %hex::encode(&ack), "RCP reset acknowledged");

    let coordinator = Coordinator::spawn(client, store.clone(), CoordinatorConfig::default());
    coordinator.attach_network(&network_id).await?;
    info!(network = %network_id, "attached, ctrl-c to detach and exit");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    coordinator.detach_network().await?;
    Ok(())
}
