//! Commands dispatched from the HTTP API to the oracle event loop.

use routewise_core::NodeId;
use routewise_oracle::{
    AgeResult, Constraint, CreateChannel, GetRoutes, InformChannel, LayerSummary, LocalChannel,
    OracleError, OracleStatus, ReserveHop, Route,
};
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<Result<T, OracleError>>;

/// A command sent from the HTTP API to the node's event loop, which owns
/// the oracle and runs one command at a time.
pub enum NodeCommand {
    CreateChannel {
        req: CreateChannel,
        reply: Reply<Option<LocalChannel>>,
    },
    InformChannel {
        req: InformChannel,
        reply: Reply<Option<Constraint>>,
    },
    DisableNode {
        layer: String,
        node: NodeId,
        reply: Reply<()>,
    },
    ListLayers {
        layer: Option<String>,
        reply: oneshot::Sender<Vec<LayerSummary>>,
    },
    Age {
        layer: String,
        cutoff: u64,
        reply: Reply<AgeResult>,
    },
    Reserve {
        path: Vec<ReserveHop>,
        reply: Reply<()>,
    },
    Unreserve {
        path: Vec<ReserveHop>,
        reply: Reply<()>,
    },
    GetRoutes {
        req: GetRoutes,
        reply: Reply<Vec<Route>>,
    },
    Status {
        reply: oneshot::Sender<OracleStatus>,
    },
}

impl NodeCommand {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            NodeCommand::CreateChannel { .. } => "create-channel",
            NodeCommand::InformChannel { .. } => "inform-channel",
            NodeCommand::DisableNode { .. } => "disable-node",
            NodeCommand::ListLayers { .. } => "listlayers",
            NodeCommand::Age { .. } => "age",
            NodeCommand::Reserve { .. } => "reserve",
            NodeCommand::Unreserve { .. } => "unreserve",
            NodeCommand::GetRoutes { .. } => "getroutes",
            NodeCommand::Status { .. } => "status",
        }
    }
}
