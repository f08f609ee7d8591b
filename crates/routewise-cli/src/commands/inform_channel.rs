//! `routewise inform-channel`: record a min or max bound on one channel
//! direction.

use clap::Args;
use routewise_core::{AmountMsat, ShortChannelId};
use routewise_oracle::{Constraint, InformChannel};
use serde::Deserialize;

use crate::client;

#[derive(Args, Debug)]
pub struct InformChannelArgs {
    /// Layer to record the bound in (created if missing).
    #[arg(short, long)]
    pub layer: String,

    /// Short channel id, as BLOCKxTXxOUT.
    #[arg(long)]
    pub scid: ShortChannelId,

    /// Channel direction, 0 or 1.
    #[arg(short, long)]
    pub direction: u32,

    /// The direction can carry at least this much.
    #[arg(long, conflicts_with = "maximum_msat", required_unless_present = "maximum_msat")]
    pub minimum_msat: Option<u64>,

    /// The direction can carry at most this much.
    #[arg(long)]
    pub maximum_msat: Option<u64>,

    /// Validate without recording anything.
    #[arg(long)]
    pub check_only: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl InformChannelArgs {
    fn request(&self) -> InformChannel {
        InformChannel {
            layer: self.layer.clone(),
            short_channel_id: self.scid,
            direction: self.direction,
            minimum_msat: self.minimum_msat.map(AmountMsat),
            maximum_msat: self.maximum_msat.map(AmountMsat),
            check_only: self.check_only,
        }
    }
}

#[derive(Deserialize)]
struct InformChannelResponse {
    constraint: Option<Constraint>,
}

pub async fn run(args: &InformChannelArgs) -> anyhow::Result<()> {
    let resp: InformChannelResponse =
        client::post(&args.endpoint, "layers/constraints", &args.request()).await?;
    match resp.constraint {
        Some(constraint) => client::print_json(&constraint),
        None => {
            println!("Constraint is valid (not recorded)");
            Ok(())
        }
    }
}
