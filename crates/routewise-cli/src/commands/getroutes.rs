//! `routewise getroutes`: ask the node for candidate routes.

use clap::Args;
use routewise_core::{AmountMsat, NodeId};
use routewise_oracle::{GetRoutes, Route};
use serde::{Deserialize, Serialize};

use crate::client;

#[derive(Args, Debug)]
pub struct GetRoutesArgs {
    /// Paying node.
    #[arg(long)]
    pub source: NodeId,

    /// Receiving node.
    #[arg(long)]
    pub destination: NodeId,

    /// Amount to deliver, in msat.
    #[arg(short, long)]
    pub amount_msat: u64,

    /// Layers to apply, in order. May be repeated.
    #[arg(short, long = "layer")]
    pub layers: Vec<String>,

    /// Print the raw JSON reply instead of a summary.
    #[arg(long)]
    pub json: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize, Deserialize)]
struct RoutesResponse {
    routes: Vec<Route>,
}

pub async fn run(args: &GetRoutesArgs) -> anyhow::Result<()> {
    let body = GetRoutes {
        source: args.source,
        destination: args.destination,
        amount_msat: AmountMsat(args.amount_msat),
        layers: args.layers.clone(),
    };
    let resp: RoutesResponse = client::post(&args.endpoint, "routes", &body).await?;
    if args.json {
        return client::print_json(&resp);
    }

    println!("Found {} route(s)", resp.routes.len());
    for (i, route) in resp.routes.iter().enumerate() {
        println!();
        println!(
            "Route {} ({} hops, {} ppm, total delay {}):",
            i + 1,
            route.hop_count(),
            route.probability_ppm,
            route.total_delay()
        );
        for hop in &route.path {
            println!(
                "  {}/{} -> {}  {}  delay {}",
                hop.short_channel_id, hop.direction, hop.node_id, hop.amount, hop.delay
            );
        }
    }
    Ok(())
}
