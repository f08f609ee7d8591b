//! Shared node state for cross-task communication.

use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::commands::NodeCommand;

/// Shared state for the running node, accessible from HTTP handlers.
pub struct NodeState {
    /// When the node started.
    pub start_time: Instant,
    /// Graph snapshot the oracle routes over.
    pub graph_path: PathBuf,
    /// Channel to send commands to the event loop.
    pub command_tx: mpsc::Sender<NodeCommand>,
}

impl NodeState {
    pub fn new(graph_path: PathBuf, command_tx: mpsc::Sender<NodeCommand>) -> Self {
        Self {
            start_time: Instant::now(),
            graph_path,
            command_tx,
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
