//! `routewise status`: query the status of a running node.

use clap::Args;
use routewise_core::AmountMsat;
use serde::Deserialize;

use crate::client;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    graph_path: String,
    channels: usize,
    layers: usize,
    reservations: usize,
    reserved_msat: AmountMsat,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let status: StatusResponse = client::get(&args.endpoint, "status", &[]).await?;
    println!("Node Status:");
    println!("  Version:       {}", status.version);
    println!("  Uptime:        {}s", status.uptime_secs);
    println!("  Graph:         {}", status.graph_path);
    println!("  Channels:      {}", status.channels);
    println!("  Layers:        {}", status.layers);
    println!("  Reservations:  {}", status.reservations);
    println!("  Reserved:      {}", status.reserved_msat);
    Ok(())
}
