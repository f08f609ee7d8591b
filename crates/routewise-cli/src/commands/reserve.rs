//! `routewise reserve` / `routewise unreserve`: mark or release in-flight
//! amounts along a path.

use anyhow::Context;
use clap::Args;
use routewise_core::{AmountMsat, ChannelDirection, ShortChannelId};
use routewise_oracle::ReserveHop;
use serde::{Deserialize, Serialize};

use crate::client;

#[derive(Args, Debug)]
pub struct ReserveArgs {
    /// Hops as SCID/DIR:AMOUNT_MSAT, e.g. 103x1x0/1:5000000.
    #[arg(required = true, value_parser = parse_hop)]
    pub hops: Vec<ReserveHop>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

/// Parse one `SCID/DIR:AMOUNT_MSAT` hop.
pub fn parse_hop(s: &str) -> anyhow::Result<ReserveHop> {
    let (scidd, amount) = s
        .split_once(':')
        .with_context(|| format!("expected SCID/DIR:AMOUNT_MSAT, got {s:?}"))?;
    let (scid, direction) = scidd
        .split_once('/')
        .with_context(|| format!("expected SCID/DIR, got {scidd:?}"))?;
    let scid: ShortChannelId = scid.parse()?;
    let direction: u32 = direction
        .parse()
        .with_context(|| format!("bad direction {direction:?}"))?;
    let amount: u64 = amount
        .parse()
        .with_context(|| format!("bad amount {amount:?}"))?;
    Ok(ReserveHop {
        scidd: ChannelDirection::new(scid, direction)?,
        amount: AmountMsat(amount),
    })
}

#[derive(Serialize)]
struct PathRequest<'a> {
    path: &'a [ReserveHop],
}

#[derive(Deserialize)]
struct EmptyResponse {}

async fn post_path(args: &ReserveArgs, path: &str) -> anyhow::Result<()> {
    let body = PathRequest { path: &args.hops };
    let _: EmptyResponse = client::post(&args.endpoint, path, &body).await?;
    Ok(())
}

pub async fn reserve(args: &ReserveArgs) -> anyhow::Result<()> {
    post_path(args, "reserve").await?;
    println!("Reserved {} hop(s)", args.hops.len());
    Ok(())
}

pub async fn unreserve(args: &ReserveArgs) -> anyhow::Result<()> {
    post_path(args, "unreserve").await?;
    println!("Released {} hop(s)", args.hops.len());
    Ok(())
}
