//! Fixtures shared by the cross-crate integration tests.
//!
//! The base graph is a short line of public channels:
//!
//! ```text
//! node(1) --[1]-- node(2) --[2]-- node(3)
//! ```
//!
//! Both channels have 2^20 sat of capacity, which the capacity cache holds
//! exactly, and 6 blocks of delay in each direction.

use routewise_core::{
    AmountMsat, AmountSat, ChannelDirection, NodeId, OracleConfig, ShortChannelId,
};
use routewise_graph::{HalfChannel, MemoryGraph};
use routewise_oracle::{CreateChannel, InformChannel, ReserveHop, RouteOracle};

pub const BASE_CAPACITY_SAT: u64 = 1_048_576;

pub fn node(last: u8) -> NodeId {
    let mut bytes = [0u8; 33];
    bytes[0] = 0x02;
    bytes[32] = last;
    NodeId::from_bytes(bytes).expect("valid node id")
}

pub fn scid(n: u64) -> ShortChannelId {
    ShortChannelId(n)
}

pub fn scidd(n: u64, direction: u32) -> ChannelDirection {
    ChannelDirection::new(scid(n), direction).expect("valid direction")
}

pub fn half(delay: u16) -> HalfChannel {
    HalfChannel {
        enabled: true,
        htlc_minimum_msat: AmountMsat(0),
        htlc_maximum_msat: AmountMsat(BASE_CAPACITY_SAT * 1_000),
        fee_base_msat: AmountMsat(0),
        fee_proportional_millionths: 0,
        delay,
    }
}

/// Add a public channel with both directions enabled.
pub fn add_public_channel(graph: &mut MemoryGraph, n: u64, a: NodeId, b: NodeId) {
    add_channel_with_capacity(graph, n, a, b, BASE_CAPACITY_SAT);
}

pub fn add_channel_with_capacity(
    graph: &mut MemoryGraph,
    n: u64,
    a: NodeId,
    b: NodeId,
    capacity_sat: u64,
) {
    graph
        .insert_channel(scid(n), a, b, Some(AmountSat(capacity_sat)))
        .expect("insert channel");
    for direction in [0, 1] {
        graph
            .update_channel(scidd(n, direction), half(6))
            .expect("update channel");
    }
}

pub fn base_graph() -> MemoryGraph {
    let mut graph = MemoryGraph::new();
    add_public_channel(&mut graph, 1, node(1), node(2));
    add_public_channel(&mut graph, 2, node(2), node(3));
    graph
}

pub fn oracle() -> RouteOracle {
    RouteOracle::new(Box::new(base_graph()), OracleConfig::default())
}

/// A local channel request with htlc bounds `[1, capacity]`.
pub fn local_channel(
    layer: &str,
    n: u64,
    source: NodeId,
    destination: NodeId,
    capacity_msat: u64,
) -> CreateChannel {
    CreateChannel {
        layer: layer.to_string(),
        source,
        destination,
        short_channel_id: scid(n),
        capacity_msat: AmountMsat(capacity_msat),
        htlc_minimum_msat: AmountMsat(1),
        htlc_maximum_msat: AmountMsat(capacity_msat),
        fee_base_msat: AmountMsat(0),
        fee_proportional_millionths: 0,
        delay: 6,
        check_only: false,
    }
}

pub fn max_bound(layer: &str, n: u64, direction: u32, amount_msat: u64) -> InformChannel {
    InformChannel {
        layer: layer.to_string(),
        short_channel_id: scid(n),
        direction,
        minimum_msat: None,
        maximum_msat: Some(AmountMsat(amount_msat)),
        check_only: false,
    }
}

pub fn min_bound(layer: &str, n: u64, direction: u32, amount_msat: u64) -> InformChannel {
    InformChannel {
        minimum_msat: Some(AmountMsat(amount_msat)),
        maximum_msat: None,
        ..max_bound(layer, n, direction, 0)
    }
}

pub fn hop(n: u64, direction: u32, amount_msat: u64) -> ReserveHop {
    ReserveHop {
        scidd: scidd(n, direction),
        amount: AmountMsat(amount_msat),
    }
}

pub fn layers(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The usable `(min, max)` range of one channel direction in a query over
/// `layer_names`.
pub fn usable_range(
    oracle: &mut RouteOracle,
    layer_names: &[&str],
    n: u64,
    direction: u32,
) -> (AmountMsat, AmountMsat) {
    let ctx = oracle.query(&layers(layer_names)).expect("query context");
    let channel = ctx
        .graph()
        .find_channel(&scid(n))
        .expect("channel visible in query");
    let range = ctx.get_constraints(channel, scidd(n, direction));
    range
}
