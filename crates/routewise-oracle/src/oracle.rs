use routewise_core::{
    now_timestamp, AmountMsat, ChannelDirection, ConstraintKind, NodeId, OracleConfig,
    ShortChannelId,
};
use routewise_graph::GraphView;
use serde::{Deserialize, Serialize};

use crate::capacity::CapacityTable;
use crate::constraint::Constraint;
use crate::error::OracleError;
use crate::layer::{Layer, LayerSummary, LocalChannel};
use crate::pathfinder::{PathFinder, PathSearch};
use crate::query::RouteQueryContext;
use crate::reserve::{ReservationLedger, ReserveHop};
use crate::route::Route;
use crate::store::LayerStore;

/// Request to create or refresh a local channel in a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChannel {
    pub layer: String,
    pub source: NodeId,
    pub destination: NodeId,
    pub short_channel_id: ShortChannelId,
    pub capacity_msat: AmountMsat,
    pub htlc_minimum_msat: AmountMsat,
    pub htlc_maximum_msat: AmountMsat,
    pub fee_base_msat: AmountMsat,
    pub fee_proportional_millionths: u32,
    pub delay: u16,
    /// Validate only; change nothing.
    #[serde(default)]
    pub check_only: bool,
}

impl CreateChannel {
    fn local_channel(&self) -> LocalChannel {
        LocalChannel {
            scid: self.short_channel_id,
            source: self.source,
            destination: self.destination,
            capacity: self.capacity_msat,
            htlc_minimum_msat: self.htlc_minimum_msat,
            htlc_maximum_msat: self.htlc_maximum_msat,
            fee_base_msat: self.fee_base_msat,
            fee_proportional_millionths: self.fee_proportional_millionths,
            delay: self.delay,
        }
    }
}

/// Request to set a min or max bound on one channel direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InformChannel {
    pub layer: String,
    pub short_channel_id: ShortChannelId,
    pub direction: u32,
    #[serde(default)]
    pub minimum_msat: Option<AmountMsat>,
    #[serde(default)]
    pub maximum_msat: Option<AmountMsat>,
    #[serde(default)]
    pub check_only: bool,
}

/// Request for candidate routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRoutes {
    pub source: NodeId,
    pub destination: NodeId,
    pub amount_msat: AmountMsat,
    #[serde(default)]
    pub layers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeResult {
    pub layer: String,
    pub num_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleStatus {
    pub channels: usize,
    pub layers: usize,
    pub reservations: usize,
    pub reserved_msat: AmountMsat,
}

/// The routing oracle: owns the graph, the layers and the reservation
/// ledger, and answers route queries over them.
pub struct RouteOracle {
    graph: Box<dyn GraphView>,
    capacities: CapacityTable,
    layers: LayerStore,
    reserves: ReservationLedger,
    search: Box<dyn PathSearch>,
    config: OracleConfig,
}

impl RouteOracle {
    pub fn new(mut graph: Box<dyn GraphView>, config: OracleConfig) -> Self {
        graph.refresh();
        let capacities = CapacityTable::build(graph.as_ref());
        let search = Box::new(PathFinder::new((&config).into()));
        tracing::info!(
            channels = capacities.len(),
            max_hops = config.max_hops,
            max_routes = config.max_routes,
            "route oracle initialized"
        );
        Self {
            graph,
            capacities,
            layers: LayerStore::new(),
            reserves: ReservationLedger::new(),
            search,
            config,
        }
    }

    /// Replace the bundled path search.
    pub fn with_path_search(mut self, search: Box<dyn PathSearch>) -> Self {
        self.search = search;
        self
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn graph(&self) -> &dyn GraphView {
        self.graph.as_ref()
    }

    pub fn layers(&self) -> &LayerStore {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStore {
        &mut self.layers
    }

    pub fn reserves(&self) -> &ReservationLedger {
        &self.reserves
    }

    /// Create or refresh a local channel, creating the layer if needed.
    ///
    /// Returns the stored channel, or `None` for a check-only request.
    pub fn create_channel(
        &mut self,
        req: &CreateChannel,
    ) -> Result<Option<LocalChannel>, OracleError> {
        check_layer_name(&req.layer)?;
        let channel = req.local_channel();
        let check = |layer: &Layer| {
            layer.check_local_channel(
                channel.scid,
                &channel.source,
                &channel.destination,
                channel.capacity,
            )
        };
        match self.layers.find(&req.layer) {
            Some(layer) => check(layer)?,
            None => check(&Layer::new(req.layer.as_str()))?,
        }
        if req.check_only {
            return Ok(None);
        }

        let stored = self
            .layers
            .find_or_create(&req.layer)
            .update_local_channel(channel, now_timestamp())?
            .clone();
        tracing::info!(
            layer = %req.layer,
            scid = %stored.scid,
            capacity = %stored.capacity,
            "local channel updated"
        );
        Ok(Some(stored))
    }

    /// Set a constraint stamped with the current time.
    ///
    /// Returns the stored constraint, or `None` for a check-only request.
    pub fn inform_channel(
        &mut self,
        req: &InformChannel,
    ) -> Result<Option<Constraint>, OracleError> {
        check_layer_name(&req.layer)?;
        let scidd = ChannelDirection::new(req.short_channel_id, req.direction)
            .map_err(|_| OracleError::bad_param("direction", req.direction, "should be 0 or 1"))?;
        let (kind, limit) = match (req.minimum_msat, req.maximum_msat) {
            (Some(min), None) => (ConstraintKind::Min, min),
            (None, Some(max)) => (ConstraintKind::Max, max),
            (min, max) => {
                return Err(OracleError::bad_param(
                    "minimum_msat/maximum_msat",
                    format!("{:?}/{:?}", min.map(|m| m.0), max.map(|m| m.0)),
                    "must specify exactly one of maximum_msat/minimum_msat",
                ))
            }
        };
        if req.check_only {
            return Ok(None);
        }

        let constraint = self.layers.find_or_create(&req.layer).update_constraint(
            scidd,
            kind,
            now_timestamp(),
            limit,
        );
        tracing::info!(layer = %req.layer, %scidd, %kind, %limit, "constraint updated");
        Ok(Some(constraint))
    }

    /// Disable `node` in `layer`, creating the layer if needed.
    pub fn disable_node(&mut self, layer: &str, node: NodeId) -> Result<(), OracleError> {
        check_layer_name(layer)?;
        if self.layers.find_or_create(layer).add_disabled_node(node) {
            tracing::info!(%layer, %node, "node disabled");
        }
        Ok(())
    }

    pub fn list_layers(&self, layer: Option<&str>) -> Vec<LayerSummary> {
        self.layers.list(layer)
    }

    /// Remove constraints older than `cutoff` from an existing layer.
    pub fn age(&mut self, layer: &str, cutoff: u64) -> Result<AgeResult, OracleError> {
        let num_removed = self.layers.trim_constraints(layer, cutoff)?;
        Ok(AgeResult {
            layer: layer.to_string(),
            num_removed,
        })
    }

    /// Reserve capacity along `path`.
    ///
    /// On overflow the hops before the failing one stay reserved; the error
    /// names the failing hop so the caller can release the prefix.
    pub fn reserve(&self, path: &[ReserveHop]) -> Result<(), OracleError> {
        let applied = self.reserves.add(path);
        if let Some(hop) = path.get(applied) {
            let err = OracleError::ReserveOverflow {
                index: applied,
                scidd: hop.scidd,
                amount: hop.amount,
                reserved: self.reserves.find(&hop.scidd).map(|r| r.amount),
            };
            tracing::warn!(error = %err, "reservation failed");
            return Err(err);
        }
        tracing::debug!(hops = path.len(), "path reserved");
        Ok(())
    }

    /// Release capacity along `path`, symmetric to [`reserve`](Self::reserve).
    pub fn unreserve(&self, path: &[ReserveHop]) -> Result<(), OracleError> {
        let applied = self.reserves.remove(path);
        if let Some(hop) = path.get(applied) {
            let existing = self.reserves.find(&hop.scidd);
            let err = OracleError::ReserveUnderflow {
                index: applied,
                scidd: hop.scidd,
                amount: hop.amount,
                num_htlcs: existing.map(|r| r.num_htlcs).unwrap_or(0),
                reserved: existing.map(|r| r.amount),
            };
            tracing::warn!(error = %err, "unreservation failed");
            return Err(err);
        }
        tracing::debug!(hops = path.len(), "path unreserved");
        Ok(())
    }

    /// Open a query context over `layers`. The layers stay applied to the
    /// graph until the context is dropped.
    pub fn query(&mut self, layers: &[String]) -> Result<RouteQueryContext<'_>, OracleError> {
        RouteQueryContext::new(
            self.graph.as_mut(),
            &mut self.capacities,
            &self.layers,
            layers,
            &self.reserves,
        )
    }

    /// Compute candidate routes for `req`.
    pub fn get_routes(&mut self, req: &GetRoutes) -> Result<Vec<Route>, OracleError> {
        if req.amount_msat.is_zero() {
            return Err(OracleError::bad_param(
                "amount_msat",
                req.amount_msat,
                "must be positive",
            ));
        }
        if req.source == req.destination {
            return Err(OracleError::bad_param(
                "destination",
                req.destination,
                "must differ from source",
            ));
        }

        let ctx = RouteQueryContext::new(
            self.graph.as_mut(),
            &mut self.capacities,
            &self.layers,
            &req.layers,
            &self.reserves,
        )?;
        let routes = self
            .search
            .find_routes(&ctx, &req.source, &req.destination, req.amount_msat);
        drop(ctx);

        match &routes {
            Ok(found) => tracing::info!(
                source = %req.source,
                destination = %req.destination,
                amount = %req.amount_msat,
                routes = found.len(),
                "routes computed"
            ),
            Err(e) => tracing::info!(error = %e, "no routes"),
        }
        routes
    }

    pub fn status(&self) -> OracleStatus {
        OracleStatus {
            channels: self.graph.channels().count(),
            layers: self.layers.len(),
            reservations: self.reserves.len(),
            reserved_msat: self.reserves.total_reserved(),
        }
    }
}

fn check_layer_name(name: &str) -> Result<(), OracleError> {
    if name.is_empty() {
        return Err(OracleError::bad_param("layer", "\"\"", "must not be empty"));
    }
    Ok(())
}
