use std::collections::{BTreeMap, BTreeSet};

use routewise_core::{AmountMsat, ChannelDirection, ConstraintKind, NodeId, ShortChannelId};
use routewise_graph::{GraphView, HalfChannel, LocalMods};
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTable;
use crate::constraint::{Constraint, ConstraintTable};
use crate::error::OracleError;

/// A hypothetical channel defined inside a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalChannel {
    #[serde(rename = "short_channel_id")]
    pub scid: ShortChannelId,
    pub source: NodeId,
    pub destination: NodeId,
    #[serde(rename = "capacity_msat")]
    pub capacity: AmountMsat,
    pub htlc_minimum_msat: AmountMsat,
    pub htlc_maximum_msat: AmountMsat,
    pub fee_base_msat: AmountMsat,
    pub fee_proportional_millionths: u32,
    pub delay: u16,
}

impl LocalChannel {
    /// The direction in which this channel carries payments.
    pub fn direction(&self) -> ChannelDirection {
        ChannelDirection::between(self.scid, &self.source, &self.destination)
    }

    pub fn half_channel(&self) -> HalfChannel {
        HalfChannel {
            enabled: true,
            htlc_minimum_msat: self.htlc_minimum_msat,
            htlc_maximum_msat: self.htlc_maximum_msat,
            fee_base_msat: self.fee_base_msat,
            fee_proportional_millionths: self.fee_proportional_millionths,
            delay: self.delay,
        }
    }
}

/// Listing entry for one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSummary {
    pub layer: String,
    pub num_local_channels: usize,
    pub num_constraints: usize,
    pub num_disabled_nodes: usize,
    pub local_channels: Vec<LocalChannel>,
    pub constraints: Vec<Constraint>,
    pub disabled_nodes: Vec<NodeId>,
}

/// A named overlay of hypothetical channels, amount constraints and
/// disabled nodes.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    local_channels: BTreeMap<ShortChannelId, LocalChannel>,
    constraints: ConstraintTable,
    disabled_nodes: BTreeSet<NodeId>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_channels: BTreeMap::new(),
            constraints: ConstraintTable::new(),
            disabled_nodes: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Verify that defining `scid` with these endpoints and capacity would
    /// not redefine an existing local channel. Nothing is modified.
    pub fn check_local_channel(
        &self,
        scid: ShortChannelId,
        source: &NodeId,
        destination: &NodeId,
        capacity: AmountMsat,
    ) -> Result<(), OracleError> {
        if source == destination {
            return Err(OracleError::bad_param(
                "destination",
                destination,
                "must differ from source",
            ));
        }
        match self.local_channels.get(&scid) {
            Some(existing)
                if existing.source != *source
                    || existing.destination != *destination
                    || existing.capacity != capacity =>
            {
                Err(OracleError::ChannelConflict {
                    layer: self.name.clone(),
                    scid,
                })
            }
            _ => Ok(()),
        }
    }

    /// Insert a local channel or refresh the policy of an existing one.
    ///
    /// A new channel also gets a MAX constraint equal to its capacity, so
    /// every hypothetical channel carries an explicit bound.
    pub fn update_local_channel(
        &mut self,
        channel: LocalChannel,
        timestamp: u64,
    ) -> Result<&LocalChannel, OracleError> {
        self.check_local_channel(
            channel.scid,
            &channel.source,
            &channel.destination,
            channel.capacity,
        )?;
        let scid = channel.scid;
        if !self.local_channels.contains_key(&scid) {
            self.constraints.update(
                channel.direction(),
                ConstraintKind::Max,
                timestamp,
                channel.capacity,
            );
            tracing::debug!(layer = %self.name, %scid, "created local channel");
        }
        let stored = self.local_channels.entry(scid).or_insert_with(|| channel.clone());
        stored.htlc_minimum_msat = channel.htlc_minimum_msat;
        stored.htlc_maximum_msat = channel.htlc_maximum_msat;
        stored.fee_base_msat = channel.fee_base_msat;
        stored.fee_proportional_millionths = channel.fee_proportional_millionths;
        stored.delay = channel.delay;
        Ok(stored)
    }

    pub fn find_local_channel(&self, scid: &ShortChannelId) -> Option<&LocalChannel> {
        self.local_channels.get(scid)
    }

    pub fn local_channels(&self) -> impl Iterator<Item = &LocalChannel> {
        self.local_channels.values()
    }

    /// Returns `false` if the node was already disabled.
    pub fn add_disabled_node(&mut self, node: NodeId) -> bool {
        self.disabled_nodes.insert(node)
    }

    pub fn is_disabled(&self, node: &NodeId) -> bool {
        self.disabled_nodes.contains(node)
    }

    pub fn update_constraint(
        &mut self,
        scidd: ChannelDirection,
        kind: ConstraintKind,
        timestamp: u64,
        limit: AmountMsat,
    ) -> Constraint {
        self.constraints.update(scidd, kind, timestamp, limit)
    }

    pub fn find_constraint(
        &self,
        scidd: &ChannelDirection,
        kind: ConstraintKind,
    ) -> Option<&Constraint> {
        self.constraints.find(scidd, kind)
    }

    pub fn trim_constraints(&mut self, cutoff: u64) -> usize {
        self.constraints.trim(cutoff)
    }

    pub fn constraints(&self) -> &ConstraintTable {
        &self.constraints
    }

    /// Merge this layer's topology into `mods`.
    pub fn add_local_mods(&self, mods: &mut LocalMods) {
        for channel in self.local_channels.values() {
            mods.add_channel(channel.scid, channel.source, channel.destination);
            mods.update_channel(channel.direction(), channel.half_channel());
        }
        for node in &self.disabled_nodes {
            mods.disable_node(*node);
        }
    }

    /// Every channel whose usable range this layer may change: its own local
    /// channels plus any channel it constrains.
    pub fn overridden_channels(&self) -> impl Iterator<Item = ShortChannelId> + '_ {
        self.local_channels
            .keys()
            .copied()
            .chain(self.constraints.iter().map(|c| c.scidd.scid))
    }

    /// Force the slow path in `table` for every channel this layer overrides.
    pub fn clear_overridden_capacities(&self, graph: &dyn GraphView, table: &mut CapacityTable) {
        for scid in self.overridden_channels() {
            if let Some(channel) = graph.find_channel(&scid) {
                table.clear(channel.index);
            }
        }
    }

    pub fn summary(&self) -> LayerSummary {
        let mut constraints: Vec<Constraint> = self.constraints.iter().copied().collect();
        constraints.sort_by_key(|c| (c.scidd, c.kind));
        LayerSummary {
            layer: self.name.clone(),
            num_local_channels: self.local_channels.len(),
            num_constraints: constraints.len(),
            num_disabled_nodes: self.disabled_nodes.len(),
            local_channels: self.local_channels.values().cloned().collect(),
            constraints,
            disabled_nodes: self.disabled_nodes.iter().copied().collect(),
        }
    }
}
