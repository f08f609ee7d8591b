use routewise_core::{AmountMsat, ChannelDirection, ConstraintKind, NodeId};
use routewise_graph::{Channel, GraphView, LocalMods};

use crate::capacity::CapacityTable;
use crate::error::OracleError;
use crate::layer::Layer;
use crate::reserve::ReservationLedger;
use crate::store::LayerStore;

/// Request-scoped view of the graph with the requested layers applied.
///
/// The layers' topology stays attached to the graph for as long as the
/// context lives and is detached when it is dropped, whichever way the
/// query ends.
pub struct RouteQueryContext<'a> {
    graph: &'a mut dyn GraphView,
    layers: Vec<&'a Layer>,
    reserves: &'a ReservationLedger,
    capacities: CapacityTable,
    mods: LocalMods,
}

impl<'a> RouteQueryContext<'a> {
    /// Build a context for a query over `layer_names`.
    ///
    /// `shared` is the long-lived capacity table; it is rebuilt here if the
    /// graph changed and then copied so this query can clear entries freely.
    /// Names that match no layer are skipped.
    pub fn new(
        graph: &'a mut dyn GraphView,
        shared: &mut CapacityTable,
        store: &'a LayerStore,
        layer_names: &[String],
        reserves: &'a ReservationLedger,
    ) -> Result<Self, OracleError> {
        if graph.refresh() {
            *shared = CapacityTable::build(&*graph);
        }
        let mut capacities = shared.clone();

        let mut layers = Vec::with_capacity(layer_names.len());
        let mut mods = LocalMods::new();
        for name in layer_names {
            let Some(layer) = store.find(name) else {
                tracing::debug!(layer = %name, "unknown layer in query, treating as empty");
                continue;
            };
            layer.add_local_mods(&mut mods);
            layer.clear_overridden_capacities(&*graph, &mut capacities);
            layers.push(layer);
        }
        reserves.clear_from_capacity_table(&*graph, &mut capacities);

        graph.apply_local_mods(&mods)?;
        tracing::trace!(
            layers = layers.len(),
            local_channels = mods.channels().len(),
            "query context ready"
        );

        Ok(Self {
            graph,
            layers,
            reserves,
            capacities,
            mods,
        })
    }

    pub fn graph(&self) -> &dyn GraphView {
        &*self.graph
    }

    pub fn layers(&self) -> &[&'a Layer] {
        &self.layers
    }

    pub fn local_mods(&self) -> &LocalMods {
        &self.mods
    }

    pub fn capacities(&self) -> &CapacityTable {
        &self.capacities
    }

    pub fn is_disabled(&self, node: &NodeId) -> bool {
        self.mods.is_disabled(node)
    }

    /// The usable `(min, max)` range of `channel` in the direction `scidd`
    /// for this query.
    ///
    /// Channels with a cached capacity take the fast path. Otherwise every
    /// layer in the query is consulted: the largest MIN and the smallest MAX
    /// win. Without any MAX the graph capacity applies, rounded the same way
    /// as the cache. Any reservation is then subtracted from both bounds,
    /// clamping at zero.
    pub fn get_constraints(
        &self,
        channel: &Channel,
        scidd: ChannelDirection,
    ) -> (AmountMsat, AmountMsat) {
        let mut min = AmountMsat::ZERO;
        if scidd.scid != channel.scid {
            tracing::error!(%scidd, channel = %channel.scid, "constraint lookup for another channel");
            return (min, AmountMsat::ZERO);
        }
        if let Some(max) = self.capacities.get(channel.index) {
            return (min, max);
        }

        let mut max: Option<AmountMsat> = None;
        for layer in &self.layers {
            if let Some(c) = layer.find_constraint(&scidd, ConstraintKind::Min) {
                min = min.max(c.limit);
            }
            if let Some(c) = layer.find_constraint(&scidd, ConstraintKind::Max) {
                max = Some(max.map_or(c.limit, |m| m.min(c.limit)));
            }
        }

        let mut max = match max {
            Some(max) => max,
            None => match self.graph.channel_capacity(channel) {
                Some(capacity) => CapacityTable::rounded(capacity).unwrap_or_else(|| {
                    tracing::error!(%scidd, %capacity, "channel capacity out of range");
                    AmountMsat::ZERO
                }),
                None => {
                    tracing::error!(%scidd, local = channel.local, "channel without capacity");
                    AmountMsat::ZERO
                }
            },
        };

        if let Some(reservation) = self.reserves.find(&scidd) {
            min = min.saturating_sub(reservation.amount);
            max = max.saturating_sub(reservation.amount);
        }
        (min, max)
    }
}

impl Drop for RouteQueryContext<'_> {
    fn drop(&mut self) {
        self.graph.remove_local_mods(&self.mods);
    }
}
