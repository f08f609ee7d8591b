//! `routewise listlayers`: dump one layer or all of them.

use clap::Args;
use routewise_oracle::LayerSummary;
use serde::{Deserialize, Serialize};

use crate::client;

#[derive(Args, Debug)]
pub struct ListLayersArgs {
    /// Only show this layer.
    #[arg(short, long)]
    pub layer: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize, Deserialize)]
struct LayersResponse {
    layers: Vec<LayerSummary>,
}

pub async fn run(args: &ListLayersArgs) -> anyhow::Result<()> {
    let query: Vec<(&str, &str)> = args
        .layer
        .as_deref()
        .map(|l| vec![("layer", l)])
        .unwrap_or_default();
    let resp: LayersResponse = client::get(&args.endpoint, "layers", &query).await?;
    client::print_json(&resp)
}
