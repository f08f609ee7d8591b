//! `routewise disable-node`: stop routing through a node within a layer.

use clap::Args;
use routewise_core::NodeId;
use serde::{Deserialize, Serialize};

use crate::client;

#[derive(Args, Debug)]
pub struct DisableNodeArgs {
    /// Layer to record the node in (created if missing).
    #[arg(short, long)]
    pub layer: String,

    /// Node id (66 hex characters).
    #[arg(short, long)]
    pub node: NodeId,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct DisableNodeRequest<'a> {
    layer: &'a str,
    node: NodeId,
}

#[derive(Deserialize)]
struct EmptyResponse {}

pub async fn run(args: &DisableNodeArgs) -> anyhow::Result<()> {
    let body = DisableNodeRequest {
        layer: &args.layer,
        node: args.node,
    };
    let _: EmptyResponse = client::post(&args.endpoint, "layers/disabled-nodes", &body).await?;
    println!("Disabled {} in layer {}", args.node, args.layer);
    Ok(())
}
