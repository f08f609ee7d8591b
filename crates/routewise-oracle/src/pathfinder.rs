use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use routewise_core::{AmountMsat, NodeId, OracleConfig, ShortChannelId};

use crate::error::OracleError;
use crate::query::RouteQueryContext;
use crate::route::{Route, RouteHop};

/// Success probability reported by [`PathFinder`], which does no
/// probability estimation.
const CERTAIN_PPM: u64 = 1_000_000;

/// A route computation that consumes the `(min, max)` ranges of a query
/// context.
pub trait PathSearch: Send + Sync {
    fn find_routes(
        &self,
        ctx: &RouteQueryContext<'_>,
        source: &NodeId,
        destination: &NodeId,
        amount: AmountMsat,
    ) -> Result<Vec<Route>, OracleError>;
}

/// Configuration for the PathFinder algorithm.
#[derive(Debug, Clone)]
pub struct PathFinderConfig {
    /// Maximum number of hops allowed in a single route.
    pub max_hops: u32,
    /// Maximum number of routes returned.
    pub max_routes: usize,
    /// CLTV delta the final node requires.
    pub final_cltv: u32,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        Self::from(&OracleConfig::default())
    }
}

impl From<&OracleConfig> for PathFinderConfig {
    fn from(config: &OracleConfig) -> Self {
        Self {
            max_hops: config.max_hops,
            max_routes: config.max_routes,
            final_cltv: config.final_cltv,
        }
    }
}

/// Best-first search over enabled channel directions, cheapest cumulative
/// CLTV delay first.
///
/// A node may be expanded up to `max_routes` times, which yields up to that
/// many distinct loop-free routes. Every hop forwards the full amount.
pub struct PathFinder {
    config: PathFinderConfig,
}

#[derive(Debug, Clone)]
struct Edge {
    scid: ShortChannelId,
    direction: u8,
    node_id: NodeId,
    delay: u16,
}

/// Internal node representation for the priority queue.
#[derive(Debug, Clone)]
struct SearchNode {
    node_id: NodeId,
    /// Sum of channel delays along `path`.
    total_delay: u64,
    path: Vec<Edge>,
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchNode {}

impl PartialOrd for SearchNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the smallest delay, then the
        // shortest path, pops first.
        other
            .total_delay
            .cmp(&self.total_delay)
            .then_with(|| other.path.len().cmp(&self.path.len()))
    }
}

impl PathFinder {
    pub fn new(config: PathFinderConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(PathFinderConfig::default())
    }

    pub fn config(&self) -> &PathFinderConfig {
        &self.config
    }

    /// Usable next hops from `node` for `amount`.
    fn edges(&self, ctx: &RouteQueryContext<'_>, node: &NodeId, amount: AmountMsat) -> Vec<Edge> {
        let mut edges = Vec::new();
        for channel in ctx.graph().node_channels(node) {
            let Some(direction) = channel.direction_from(node) else {
                continue;
            };
            let Some(half) = channel.half(direction) else {
                continue;
            };
            if !half.admits(amount) {
                continue;
            }
            let next = channel.destination(direction);
            if ctx.is_disabled(&next) {
                continue;
            }
            let (_, max) = ctx.get_constraints(channel, channel.channel_direction(direction));
            if max < amount {
                continue;
            }
            edges.push(Edge {
                scid: channel.scid,
                direction,
                node_id: next,
                delay: half.delay,
            });
        }
        edges
    }

    fn build_route(&self, path: &[Edge], amount: AmountMsat) -> Route {
        let mut hops = Vec::with_capacity(path.len());
        let mut delay = self.config.final_cltv;
        for (i, edge) in path.iter().enumerate().rev() {
            hops.push(RouteHop {
                short_channel_id: edge.scid,
                direction: edge.direction,
                node_id: edge.node_id,
                amount,
                delay,
            });
            // The node at the start of this channel charges its delay to
            // everything upstream.
            if i > 0 {
                delay = delay.saturating_add(edge.delay as u32);
            }
        }
        hops.reverse();
        Route {
            probability_ppm: CERTAIN_PPM,
            path: hops,
        }
    }
}

impl PathSearch for PathFinder {
    fn find_routes(
        &self,
        ctx: &RouteQueryContext<'_>,
        source: &NodeId,
        destination: &NodeId,
        amount: AmountMsat,
    ) -> Result<Vec<Route>, OracleError> {
        let max_routes = self.config.max_routes.max(1);
        let mut found: Vec<Route> = Vec::new();
        let mut heap: BinaryHeap<SearchNode> = BinaryHeap::new();
        let mut visit_counts: HashMap<NodeId, usize> = HashMap::new();

        heap.push(SearchNode {
            node_id: *source,
            total_delay: 0,
            path: Vec::new(),
        });

        while let Some(current) = heap.pop() {
            if found.len() >= max_routes {
                break;
            }

            let count = visit_counts.entry(current.node_id).or_insert(0);
            *count += 1;
            if *count > max_routes {
                continue;
            }

            if current.node_id == *destination {
                if !current.path.is_empty() {
                    found.push(self.build_route(&current.path, amount));
                }
                continue;
            }

            if current.path.len() as u32 >= self.config.max_hops {
                continue;
            }

            for edge in self.edges(ctx, &current.node_id, amount) {
                // Loop detection: don't revisit a node already on this path.
                let already_in_path = current.path.iter().any(|e| e.node_id == edge.node_id);
                if already_in_path || edge.node_id == *source {
                    continue;
                }
                let node_id = edge.node_id;
                let total_delay = current.total_delay + edge.delay as u64;
                let mut path = current.path.clone();
                path.push(edge);
                heap.push(SearchNode {
                    node_id,
                    total_delay,
                    path,
                });
            }
        }

        if found.is_empty() {
            return Err(OracleError::NoRoute {
                from: *source,
                to: *destination,
            });
        }
        tracing::debug!(routes = found.len(), %amount, "path search complete");
        Ok(found)
    }
}
