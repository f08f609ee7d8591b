//! `routewise create-channel`: add a local channel to a layer.

use clap::Args;
use routewise_core::{AmountMsat, NodeId, ShortChannelId};
use routewise_oracle::{CreateChannel, LocalChannel};
use serde::Deserialize;

use crate::client;

#[derive(Args, Debug)]
pub struct CreateChannelArgs {
    /// Layer to add the channel to (created if missing).
    #[arg(short, long)]
    pub layer: String,

    /// Node the channel leaves from.
    #[arg(long)]
    pub source: NodeId,

    /// Node the channel arrives at.
    #[arg(long)]
    pub destination: NodeId,

    /// Short channel id, as BLOCKxTXxOUT.
    #[arg(long)]
    pub scid: ShortChannelId,

    /// Channel capacity in msat.
    #[arg(long)]
    pub capacity_msat: u64,

    #[arg(long, default_value_t = 0)]
    pub htlc_minimum_msat: u64,

    #[arg(long, default_value_t = u64::MAX)]
    pub htlc_maximum_msat: u64,

    #[arg(long, default_value_t = 0)]
    pub fee_base_msat: u64,

    #[arg(long, default_value_t = 0)]
    pub fee_ppm: u32,

    /// CLTV delta.
    #[arg(long, default_value_t = 0)]
    pub delay: u16,

    /// Validate against the layer without changing it.
    #[arg(long)]
    pub check_only: bool,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl CreateChannelArgs {
    fn request(&self) -> CreateChannel {
        CreateChannel {
            layer: self.layer.clone(),
            source: self.source,
            destination: self.destination,
            short_channel_id: self.scid,
            capacity_msat: AmountMsat(self.capacity_msat),
            htlc_minimum_msat: AmountMsat(self.htlc_minimum_msat),
            htlc_maximum_msat: AmountMsat(self.htlc_maximum_msat),
            fee_base_msat: AmountMsat(self.fee_base_msat),
            fee_proportional_millionths: self.fee_ppm,
            delay: self.delay,
            check_only: self.check_only,
        }
    }
}

#[derive(Deserialize)]
struct CreateChannelResponse {
    channel: Option<LocalChannel>,
}

pub async fn run(args: &CreateChannelArgs) -> anyhow::Result<()> {
    let resp: CreateChannelResponse =
        client::post(&args.endpoint, "layers/channels", &args.request()).await?;
    match resp.channel {
        Some(channel) => client::print_json(&channel),
        None => {
            println!("Channel {} is consistent with layer {}", args.scid, args.layer);
            Ok(())
        }
    }
}
