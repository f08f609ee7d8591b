//! Routewise Graph: the network view consumed by the route oracle.
//!
//! This crate provides:
//! - [`GraphView`]: the interface the oracle uses to read channels, look up
//!   capacities, and temporarily attach hypothetical topology.
//! - [`LocalMods`]: a set of temporary channel additions, channel updates and
//!   disabled nodes applied for the duration of one query.
//! - [`MemoryGraph`]: an in-memory graph with stable per-channel indices.
//! - [`SnapshotGraph`]: a [`MemoryGraph`] fed from a JSON snapshot file and
//!   re-read when the file changes.

pub mod channel;
pub mod error;
pub mod localmods;
pub mod memory;
pub mod snapshot;
pub mod view;

pub use channel::{Channel, HalfChannel};
pub use error::GraphError;
pub use localmods::{LocalChannelMod, LocalMods};
pub use memory::MemoryGraph;
pub use snapshot::{GraphSnapshot, SnapshotChannel, SnapshotGraph};
pub use view::GraphView;
