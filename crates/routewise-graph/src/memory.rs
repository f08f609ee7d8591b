use std::collections::HashMap;

use routewise_core::{AmountSat, ChannelDirection, NodeId, ShortChannelId};

use crate::channel::{Channel, HalfChannel};
use crate::error::GraphError;
use crate::localmods::LocalMods;
use crate::view::GraphView;

/// State needed to undo an applied [`LocalMods`].
#[derive(Debug, Default)]
struct AppliedMods {
    /// Slot count before local channels were appended.
    base_len: usize,
    /// Original halves of every pre-existing channel the mods touched.
    saved_halves: Vec<(usize, [Option<HalfChannel>; 2])>,
}

/// An in-memory network graph with stable channel indices.
///
/// Removed channels leave an empty slot behind so the indices of the
/// remaining channels never move. The next public channel inserted takes
/// over the slot, which keeps the index range bounded across reloads.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    pub(crate) slots: Vec<Option<Channel>>,
    /// Empty slots left by removed base channels.
    free_slots: Vec<usize>,
    by_scid: HashMap<ShortChannelId, usize>,
    by_node: HashMap<NodeId, Vec<usize>>,
    applied: Option<AppliedMods>,
    changed: bool,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel to the base graph, returning its index.
    pub fn insert_channel(
        &mut self,
        scid: ShortChannelId,
        a: NodeId,
        b: NodeId,
        capacity: Option<AmountSat>,
    ) -> Result<usize, GraphError> {
        if self.applied.is_some() {
            return Err(GraphError::LocalModsApplied);
        }
        let index = self.push_channel(scid, a, b, capacity, false)?;
        self.changed = true;
        Ok(index)
    }

    /// Set the routing policy of one channel direction in the base graph.
    pub fn update_channel(
        &mut self,
        scidd: ChannelDirection,
        half: HalfChannel,
    ) -> Result<(), GraphError> {
        if self.applied.is_some() {
            return Err(GraphError::LocalModsApplied);
        }
        let channel = self
            .channel_mut(&scidd.scid)
            .ok_or(GraphError::UnknownChannel(scidd.scid))?;
        channel.half[scidd.direction() as usize] = Some(half);
        self.changed = true;
        Ok(())
    }

    /// Change the recorded capacity of a base channel.
    pub fn set_capacity(
        &mut self,
        scid: &ShortChannelId,
        capacity: Option<AmountSat>,
    ) -> Result<(), GraphError> {
        if self.applied.is_some() {
            return Err(GraphError::LocalModsApplied);
        }
        let channel = self
            .channel_mut(scid)
            .ok_or(GraphError::UnknownChannel(*scid))?;
        if channel.capacity != capacity {
            channel.capacity = capacity;
            self.changed = true;
        }
        Ok(())
    }

    /// Remove a channel from the base graph. Its slot is handed to the next
    /// inserted channel.
    pub fn remove_channel(&mut self, scid: &ShortChannelId) -> Result<bool, GraphError> {
        if self.applied.is_some() {
            return Err(GraphError::LocalModsApplied);
        }
        let Some(index) = self.by_scid.remove(scid) else {
            return Ok(false);
        };
        if let Some(channel) = self.slots[index].take() {
            for node in &channel.nodes {
                if let Some(list) = self.by_node.get_mut(node) {
                    list.retain(|i| *i != index);
                    if list.is_empty() {
                        self.by_node.remove(node);
                    }
                }
            }
        }
        self.free_slots.push(index);
        self.changed = true;
        Ok(true)
    }

    /// Number of live channels, including applied local channels.
    pub fn channel_count(&self) -> usize {
        self.by_scid.len()
    }

    pub fn has_local_mods(&self) -> bool {
        self.applied.is_some()
    }

    fn channel_mut(&mut self, scid: &ShortChannelId) -> Option<&mut Channel> {
        let index = *self.by_scid.get(scid)?;
        self.slots[index].as_mut()
    }

    fn push_channel(
        &mut self,
        scid: ShortChannelId,
        a: NodeId,
        b: NodeId,
        capacity: Option<AmountSat>,
        local: bool,
    ) -> Result<usize, GraphError> {
        if self.by_scid.contains_key(&scid) {
            return Err(GraphError::DuplicateChannel(scid));
        }
        if a == b {
            return Err(GraphError::SelfLoop(scid));
        }
        // Local channels always go past the base slots so they can be
        // dropped in one piece.
        let reused = if local { None } else { self.free_slots.pop() };
        let index = match reused {
            Some(index) => {
                self.slots[index] = Some(Channel::new(index, scid, a, b, capacity, local));
                index
            }
            None => {
                let index = self.slots.len();
                self.slots
                    .push(Some(Channel::new(index, scid, a, b, capacity, local)));
                index
            }
        };
        self.by_scid.insert(scid, index);
        self.by_node.entry(a).or_default().push(index);
        self.by_node.entry(b).or_default().push(index);
        Ok(index)
    }

    fn save_halves(applied: &mut AppliedMods, channel: &Channel) {
        if channel.index >= applied.base_len {
            return;
        }
        if applied.saved_halves.iter().any(|(i, _)| *i == channel.index) {
            return;
        }
        applied
            .saved_halves
            .push((channel.index, channel.half.clone()));
    }
}

impl GraphView for MemoryGraph {
    fn refresh(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn max_channel_index(&self) -> usize {
        self.slots.len()
    }

    fn channels(&self) -> Box<dyn Iterator<Item = &Channel> + '_> {
        Box::new(self.slots.iter().flatten())
    }

    fn find_channel(&self, scid: &ShortChannelId) -> Option<&Channel> {
        let index = *self.by_scid.get(scid)?;
        self.slots[index].as_ref()
    }

    fn node_channels(&self, node: &NodeId) -> Vec<&Channel> {
        self.by_node
            .get(node)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|i| self.slots[*i].as_ref())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn apply_local_mods(&mut self, mods: &LocalMods) -> Result<(), GraphError> {
        if self.applied.is_some() {
            return Err(GraphError::LocalModsApplied);
        }
        let mut applied = AppliedMods {
            base_len: self.slots.len(),
            saved_halves: Vec::new(),
        };

        for local in mods.channels() {
            if self.by_scid.contains_key(&local.scid) {
                // Overrides a public channel: only its updates apply.
                continue;
            }
            if let Err(e) =
                self.push_channel(local.scid, local.nodes[0], local.nodes[1], None, true)
            {
                tracing::warn!(scid = %local.scid, error = %e, "skipping local channel");
            }
        }

        for (scidd, half) in mods.updates() {
            let Some(&index) = self.by_scid.get(&scidd.scid) else {
                tracing::warn!(%scidd, "update for unknown local channel");
                continue;
            };
            if let Some(channel) = self.slots[index].as_mut() {
                Self::save_halves(&mut applied, channel);
                channel.half[scidd.direction() as usize] = Some(half.clone());
            }
        }

        for node in mods.disabled_nodes() {
            let indices = self.by_node.get(node).cloned().unwrap_or_default();
            for index in indices {
                if let Some(channel) = self.slots[index].as_mut() {
                    Self::save_halves(&mut applied, channel);
                    for half in channel.half.iter_mut().flatten() {
                        half.enabled = false;
                    }
                }
            }
        }

        self.applied = Some(applied);
        Ok(())
    }

    fn remove_local_mods(&mut self, _mods: &LocalMods) {
        let Some(applied) = self.applied.take() else {
            return;
        };
        for (index, halves) in applied.saved_halves.into_iter().rev() {
            if let Some(channel) = self.slots[index].as_mut() {
                channel.half = halves;
            }
        }
        for channel in self.slots.drain(applied.base_len..).flatten() {
            self.by_scid.remove(&channel.scid);
            for node in &channel.nodes {
                if let Some(list) = self.by_node.get_mut(node) {
                    list.retain(|i| *i < applied.base_len);
                    if list.is_empty() {
                        self.by_node.remove(node);
                    }
                }
            }
        }
    }
}
