use routewise_core::{AmountMsat, ChannelDirection, NodeId, ShortChannelId};
use serde::{Deserialize, Serialize};

/// One hop of a candidate route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteHop {
    pub short_channel_id: ShortChannelId,
    pub direction: u8,
    /// The node this hop delivers to.
    pub node_id: NodeId,
    /// Amount to forward over this channel.
    #[serde(rename = "amount_msat")]
    pub amount: AmountMsat,
    /// CLTV delay the payment must carry when it enters this channel.
    pub delay: u32,
}

impl RouteHop {
    pub fn channel_direction(&self) -> Option<ChannelDirection> {
        ChannelDirection::new(self.short_channel_id, self.direction as u32).ok()
    }
}

/// A candidate path from source to destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Estimated success probability in parts per million.
    pub probability_ppm: u64,
    pub path: Vec<RouteHop>,
}

impl Route {
    pub fn hop_count(&self) -> usize {
        self.path.len()
    }

    /// Amount delivered to the final node.
    pub fn amount_delivered(&self) -> AmountMsat {
        self.path.last().map(|h| h.amount).unwrap_or_default()
    }

    /// Total CLTV delay the sender must attach.
    pub fn total_delay(&self) -> u32 {
        self.path.first().map(|h| h.delay).unwrap_or_default()
    }

    /// Channel directions in path order, for reserving the route.
    pub fn channel_directions(&self) -> Vec<ChannelDirection> {
        self.path
            .iter()
            .filter_map(RouteHop::channel_direction)
            .collect()
    }
}
