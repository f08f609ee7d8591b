//! Routewise CLI: talk to a running route oracle node.
//!
//! Subcommands: status, getroutes, reserve, unreserve, create-channel,
//! inform-channel, disable-node, listlayers, age.

mod client;
mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Routewise: payment route oracle client.
#[derive(Parser, Debug)]
#[command(name = "routewise", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
    /// Find candidate routes between two nodes.
    Getroutes(commands::getroutes::GetRoutesArgs),
    /// Reserve an amount along a path.
    Reserve(commands::reserve::ReserveArgs),
    /// Release a previous reservation.
    Unreserve(commands::reserve::ReserveArgs),
    /// Add a local channel to a layer.
    CreateChannel(commands::create_channel::CreateChannelArgs),
    /// Record a capacity bound on a channel direction.
    InformChannel(commands::inform_channel::InformChannelArgs),
    /// Exclude a node from routing within a layer.
    DisableNode(commands::disable_node::DisableNodeArgs),
    /// Show layer contents.
    Listlayers(commands::listlayers::ListLayersArgs),
    /// Remove old constraints from a layer.
    Age(commands::age::AgeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Status(args) => commands::status::run(args).await,
        Commands::Getroutes(args) => commands::getroutes::run(args).await,
        Commands::Reserve(args) => commands::reserve::reserve(args).await,
        Commands::Unreserve(args) => commands::reserve::unreserve(args).await,
        Commands::CreateChannel(args) => commands::create_channel::run(args).await,
        Commands::InformChannel(args) => commands::inform_channel::run(args).await,
        Commands::DisableNode(args) => commands::disable_node::run(args).await,
        Commands::Listlayers(args) => commands::listlayers::run(args).await,
        Commands::Age(args) => commands::age::run(args).await,
    }
}
