//! Routewise Oracle: answers "which paths can carry this payment" over a
//! shared network graph, with caller-supplied layers and in-flight
//! reservations taken into account.
//!
//! This crate provides:
//! - [`LayerStore`] and [`Layer`]: named overlays of hypothetical channels,
//!   min/max constraints and disabled nodes.
//! - [`ReservationLedger`]: capacity committed to in-flight payments, backed
//!   by DashMap.
//! - [`CapacityTable`]: a compact, index-addressed capacity cache.
//! - [`RouteQueryContext`]: the per-query overlay that resolves an effective
//!   `(min, max)` range for every channel direction.
//! - [`PathSearch`] and [`PathFinder`]: the route search consuming that range.
//! - [`RouteOracle`]: the facade tying it all together.

pub mod capacity;
pub mod constraint;
pub mod error;
pub mod layer;
pub mod oracle;
pub mod pathfinder;
pub mod query;
pub mod reserve;
pub mod route;
pub mod store;

pub use capacity::{CapacityTable, Fp16};
pub use constraint::{Constraint, ConstraintTable};
pub use error::OracleError;
pub use layer::{Layer, LayerSummary, LocalChannel};
pub use oracle::{AgeResult, CreateChannel, GetRoutes, InformChannel, OracleStatus, RouteOracle};
pub use pathfinder::{PathFinder, PathFinderConfig, PathSearch};
pub use query::RouteQueryContext;
pub use reserve::{Reservation, ReservationLedger, ReserveHop};
pub use route::{Route, RouteHop};
pub use store::LayerStore;
