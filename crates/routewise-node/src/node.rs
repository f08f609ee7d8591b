//! The route oracle node.
//!
//! Loads the graph, runs the HTTP API in a background task, and owns the
//! [`RouteOracle`] in a single event loop so requests never interleave.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use routewise_graph::SnapshotGraph;
use routewise_oracle::RouteOracle;

use crate::commands::NodeCommand;
use crate::config::NodeConfig;
use crate::state::NodeState;

pub struct RouteNode {
    /// Node configuration.
    config: NodeConfig,
    /// The oracle; only the event loop touches it.
    oracle: RouteOracle,
    /// Shared state accessible from HTTP handlers.
    node_state: Option<Arc<NodeState>>,
    /// Receives commands from the HTTP API.
    command_rx: Option<mpsc::Receiver<NodeCommand>>,
}

impl RouteNode {
    /// Create a node routing over the configured graph snapshot.
    ///
    /// There is nothing useful to do without a graph, so a snapshot that
    /// cannot be loaded is an error.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let path = &config.graph.snapshot_path;
        let graph = SnapshotGraph::open(path)
            .with_context(|| format!("failed to load graph snapshot {}", path.display()))?;
        let oracle = RouteOracle::new(Box::new(graph), config.routing.clone());
        Ok(Self::with_oracle(config, oracle))
    }

    pub fn with_oracle(config: NodeConfig, oracle: RouteOracle) -> Self {
        Self {
            config,
            oracle,
            node_state: None,
            command_rx: None,
        }
    }

    /// Start the HTTP API. Returns the address it listens on.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        tracing::info!("starting route oracle node");

        let (command_tx, command_rx) = mpsc::channel::<NodeCommand>(self.config.api.queue_depth.max(1));
        let node_state = Arc::new(NodeState::new(
            self.config.graph.snapshot_path.clone(),
            command_tx,
        ));

        let listener = TcpListener::bind(self.config.api_addr()?).await?;
        let listen_addr = listener.local_addr()?;
        let api_state = node_state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::api::serve(listener, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        self.node_state = Some(node_state);
        self.command_rx = Some(command_rx);
        Ok(listen_addr)
    }

    /// Run the event loop: executes API commands one at a time.
    pub async fn run(&mut self) -> Result<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering main event loop");
        while let Some(cmd) = command_rx.recv().await {
            handle_command(&mut self.oracle, cmd);
        }
        tracing::info!("API command channel closed");
        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down route oracle node");
        let status = self.oracle.status();
        tracing::info!(
            layers = status.layers,
            reservations = status.reservations,
            "dropping in-memory state"
        );
        self.node_state = None;
        self.command_rx = None;
        Ok(())
    }
}

/// Execute one command against the oracle and send back its reply.
pub fn handle_command(oracle: &mut RouteOracle, cmd: NodeCommand) {
    let name = cmd.name();
    tracing::debug!(command = name, "handling API command");

    let delivered = match cmd {
        NodeCommand::CreateChannel { req, reply } => reply.send(oracle.create_channel(&req)).is_ok(),
        NodeCommand::InformChannel { req, reply } => reply.send(oracle.inform_channel(&req)).is_ok(),
        NodeCommand::DisableNode { layer, node, reply } => {
            reply.send(oracle.disable_node(&layer, node)).is_ok()
        }
        NodeCommand::ListLayers { layer, reply } => {
            reply.send(oracle.list_layers(layer.as_deref())).is_ok()
        }
        NodeCommand::Age {
            layer,
            cutoff,
            reply,
        } => reply.send(oracle.age(&layer, cutoff)).is_ok(),
        NodeCommand::Reserve { path, reply } => reply.send(oracle.reserve(&path)).is_ok(),
        NodeCommand::Unreserve { path, reply } => reply.send(oracle.unreserve(&path)).is_ok(),
        NodeCommand::GetRoutes { req, reply } => reply.send(oracle.get_routes(&req)).is_ok(),
        NodeCommand::Status { reply } => reply.send(oracle.status()).is_ok(),
    };
    if !delivered {
        tracing::warn!(command = name, "caller went away before the reply was sent");
    }
}
