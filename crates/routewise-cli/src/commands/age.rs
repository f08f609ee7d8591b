//! `routewise age`: drop a layer's constraints older than a cutoff.

use clap::Args;
use routewise_oracle::AgeResult;
use serde::Serialize;

use crate::client;

#[derive(Args, Debug)]
pub struct AgeArgs {
    /// Layer to trim.
    #[arg(short, long)]
    pub layer: String,

    /// Constraints with a timestamp before this (unix seconds) are removed.
    #[arg(short, long)]
    pub cutoff: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct AgeRequest<'a> {
    layer: &'a str,
    cutoff: u64,
}

pub async fn run(args: &AgeArgs) -> anyhow::Result<()> {
    let body = AgeRequest {
        layer: &args.layer,
        cutoff: args.cutoff,
    };
    let result: AgeResult = client::post(&args.endpoint, "layers/age", &body).await?;
    println!(
        "Removed {} constraint(s) from layer {}",
        result.num_removed, result.layer
    );
    Ok(())
}
