use std::collections::BTreeSet;

use routewise_core::{ChannelDirection, NodeId, ShortChannelId};

use crate::channel::HalfChannel;

/// A hypothetical channel to attach to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalChannelMod {
    pub scid: ShortChannelId,
    pub nodes: [NodeId; 2],
}

/// Temporary modifications layered onto a graph for one query.
///
/// Merging is deterministic: the first definition of a channel's endpoints
/// wins, while a later update for the same channel direction replaces an
/// earlier one.
#[derive(Debug, Clone, Default)]
pub struct LocalMods {
    channels: Vec<LocalChannelMod>,
    updates: Vec<(ChannelDirection, HalfChannel)>,
    disabled_nodes: BTreeSet<NodeId>,
}

impl LocalMods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&mut self, scid: ShortChannelId, a: NodeId, b: NodeId) {
        if self.channels.iter().any(|c| c.scid == scid) {
            return;
        }
        self.channels.push(LocalChannelMod { scid, nodes: [a, b] });
    }

    pub fn update_channel(&mut self, scidd: ChannelDirection, half: HalfChannel) {
        if let Some(existing) = self.updates.iter_mut().find(|(k, _)| *k == scidd) {
            existing.1 = half;
        } else {
            self.updates.push((scidd, half));
        }
    }

    pub fn disable_node(&mut self, node: NodeId) {
        self.disabled_nodes.insert(node);
    }

    pub fn channels(&self) -> &[LocalChannelMod] {
        &self.channels
    }

    pub fn updates(&self) -> &[(ChannelDirection, HalfChannel)] {
        &self.updates
    }

    pub fn disabled_nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.disabled_nodes.iter()
    }

    pub fn is_disabled(&self, node: &NodeId) -> bool {
        self.disabled_nodes.contains(node)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.updates.is_empty() && self.disabled_nodes.is_empty()
    }
}
