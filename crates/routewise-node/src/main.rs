//! Routewise Node: entry point.
//!
//! Starts the route oracle with configuration from a TOML file or defaults.

mod api;
mod commands;
mod config;
mod node;
mod state;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::NodeConfig;
use node::RouteNode;

/// Routewise route oracle node
#[derive(Parser, Debug)]
#[command(name = "routewise-node", version, about = "Routewise route oracle node")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "routewise.toml")]
    config: PathBuf,

    /// Override the graph snapshot path.
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(config: &NodeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        let config = NodeConfig::default();
        init_tracing(&config);
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration
    let mut config = NodeConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(graph) = args.graph {
        config.graph.snapshot_path = graph;
    }
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);
    tracing::info!("Routewise node v{}", env!("CARGO_PKG_VERSION"));

    // Without a graph there is nothing to route over: fail startup.
    let mut node = RouteNode::new(config)?;
    let listen_addr = node.start().await?;
    tracing::info!(%listen_addr, "accepting requests");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = node.run() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "node event loop error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    node.shutdown().await?;
    tracing::info!("Routewise node exited cleanly");
    Ok(())
}
