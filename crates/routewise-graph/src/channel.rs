use routewise_core::{AmountMsat, AmountSat, ChannelDirection, NodeId, ShortChannelId};
use serde::{Deserialize, Serialize};

/// Routing policy announced for one direction of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfChannel {
    /// Whether the direction currently forwards payments.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub htlc_minimum_msat: AmountMsat,
    pub htlc_maximum_msat: AmountMsat,
    pub fee_base_msat: AmountMsat,
    pub fee_proportional_millionths: u32,
    /// CLTV delta charged by the forwarding node.
    pub delay: u16,
}

fn default_enabled() -> bool {
    true
}

impl HalfChannel {
    /// Returns true if this direction is enabled and its htlc bounds admit
    /// `amount`.
    pub fn admits(&self, amount: AmountMsat) -> bool {
        self.enabled && amount >= self.htlc_minimum_msat && amount <= self.htlc_maximum_msat
    }
}

/// A channel as seen by a [`GraphView`](crate::GraphView).
///
/// `nodes` is ordered so that `nodes[0] < nodes[1]`; direction 0 runs from
/// `nodes[0]` to `nodes[1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Stable index assigned by the graph.
    pub index: usize,
    pub scid: ShortChannelId,
    pub nodes: [NodeId; 2],
    /// On-chain capacity, unknown for hypothetical channels.
    pub capacity: Option<AmountSat>,
    pub half: [Option<HalfChannel>; 2],
    /// True for channels that only exist through applied local modifications.
    pub local: bool,
}

impl Channel {
    pub(crate) fn new(
        index: usize,
        scid: ShortChannelId,
        a: NodeId,
        b: NodeId,
        capacity: Option<AmountSat>,
        local: bool,
    ) -> Self {
        let nodes = if a < b { [a, b] } else { [b, a] };
        Self {
            index,
            scid,
            nodes,
            capacity,
            half: [None, None],
            local,
        }
    }

    /// The direction in which `node` is the source, if it is an endpoint.
    pub fn direction_from(&self, node: &NodeId) -> Option<u8> {
        if *node == self.nodes[0] {
            Some(0)
        } else if *node == self.nodes[1] {
            Some(1)
        } else {
            None
        }
    }

    /// The node a payment reaches when travelling in `direction`.
    pub fn destination(&self, direction: u8) -> NodeId {
        self.nodes[(direction as usize ^ 1) & 1]
    }

    pub fn source(&self, direction: u8) -> NodeId {
        self.nodes[direction as usize & 1]
    }

    pub fn half(&self, direction: u8) -> Option<&HalfChannel> {
        self.half[direction as usize & 1].as_ref()
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    pub fn channel_direction(&self, direction: u8) -> ChannelDirection {
        ChannelDirection::between(self.scid, &self.source(direction), &self.destination(direction))
    }
}
