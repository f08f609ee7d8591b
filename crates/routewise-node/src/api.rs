//! HTTP API server for the route oracle node.
//!
//! Every handler forwards its request to the event loop as a
//! [`NodeCommand`] and waits for the reply.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use routewise_core::{AmountMsat, NodeId};
use routewise_oracle::{
    AgeResult, Constraint, CreateChannel, GetRoutes, InformChannel, LayerSummary, LocalChannel,
    OracleError, ReserveHop, Route,
};

use crate::commands::NodeCommand;
use crate::state::NodeState;

// --- Request types ---

#[derive(Deserialize)]
pub struct DisableNodeRequest {
    pub layer: String,
    pub node: NodeId,
}

#[derive(Deserialize)]
pub struct ListLayersQuery {
    pub layer: Option<String>,
}

#[derive(Deserialize)]
pub struct AgeRequest {
    pub layer: String,
    pub cutoff: u64,
}

#[derive(Deserialize)]
pub struct PathRequest {
    pub path: Vec<ReserveHop>,
}

// --- Response types ---

#[derive(Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub uptime_secs: u64,
    pub graph_path: String,
    pub channels: usize,
    pub layers: usize,
    pub reservations: usize,
    pub reserved_msat: AmountMsat,
}

#[derive(Serialize)]
pub struct CreateChannelResponse {
    /// `None` for check-only requests.
    pub channel: Option<LocalChannel>,
}

#[derive(Serialize)]
pub struct InformChannelResponse {
    /// `None` for check-only requests.
    pub constraint: Option<Constraint>,
}

#[derive(Serialize)]
pub struct LayersResponse {
    pub layers: Vec<LayerSummary>,
}

#[derive(Serialize)]
pub struct RoutesResponse {
    pub routes: Vec<Route>,
}

#[derive(Serialize)]
pub struct EmptyResponse {}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// HTTP status for an oracle error: fixable input is 400, a missing layer
/// or route is 404, anything else is 500.
pub fn error_status(err: &OracleError) -> StatusCode {
    if err.is_bad_input() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn oracle_error(err: OracleError) -> ApiError {
    (
        error_status(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Send a command to the event loop and wait for its reply.
async fn dispatch<T>(
    state: &NodeState,
    make: impl FnOnce(oneshot::Sender<T>) -> NodeCommand,
) -> Result<T, ApiError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    state
        .command_tx
        .send(make(reply_tx))
        .await
        .map_err(|_| internal_error("node event loop not running"))?;
    reply_rx
        .await
        .map_err(|_| internal_error("event loop dropped the reply channel"))
}

// --- Handlers ---

async fn handle_status(State(state): State<Arc<NodeState>>) -> ApiResult<StatusResponse> {
    let status = dispatch(&state, |reply| NodeCommand::Status { reply }).await?;
    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        graph_path: state.graph_path.display().to_string(),
        channels: status.channels,
        layers: status.layers,
        reservations: status.reservations,
        reserved_msat: status.reserved_msat,
    }))
}

async fn handle_create_channel(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<CreateChannel>,
) -> ApiResult<CreateChannelResponse> {
    let channel = dispatch(&state, |reply| NodeCommand::CreateChannel { req, reply })
        .await?
        .map_err(oracle_error)?;
    Ok(Json(CreateChannelResponse { channel }))
}

async fn handle_inform_channel(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<InformChannel>,
) -> ApiResult<InformChannelResponse> {
    let constraint = dispatch(&state, |reply| NodeCommand::InformChannel { req, reply })
        .await?
        .map_err(oracle_error)?;
    Ok(Json(InformChannelResponse { constraint }))
}

async fn handle_disable_node(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<DisableNodeRequest>,
) -> ApiResult<EmptyResponse> {
    dispatch(&state, |reply| NodeCommand::DisableNode {
        layer: req.layer,
        node: req.node,
        reply,
    })
    .await?
    .map_err(oracle_error)?;
    Ok(Json(EmptyResponse {}))
}

async fn handle_list_layers(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<ListLayersQuery>,
) -> ApiResult<LayersResponse> {
    let layers = dispatch(&state, |reply| NodeCommand::ListLayers {
        layer: query.layer,
        reply,
    })
    .await?;
    Ok(Json(LayersResponse { layers }))
}

async fn handle_age(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<AgeRequest>,
) -> ApiResult<AgeResult> {
    let result = dispatch(&state, |reply| NodeCommand::Age {
        layer: req.layer,
        cutoff: req.cutoff,
        reply,
    })
    .await?
    .map_err(oracle_error)?;
    Ok(Json(result))
}

async fn handle_reserve(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<PathRequest>,
) -> ApiResult<EmptyResponse> {
    dispatch(&state, |reply| NodeCommand::Reserve {
        path: req.path,
        reply,
    })
    .await?
    .map_err(oracle_error)?;
    Ok(Json(EmptyResponse {}))
}

async fn handle_unreserve(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<PathRequest>,
) -> ApiResult<EmptyResponse> {
    dispatch(&state, |reply| NodeCommand::Unreserve {
        path: req.path,
        reply,
    })
    .await?
    .map_err(oracle_error)?;
    Ok(Json(EmptyResponse {}))
}

async fn handle_get_routes(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<GetRoutes>,
) -> ApiResult<RoutesResponse> {
    let routes = dispatch(&state, |reply| NodeCommand::GetRoutes { req, reply })
        .await?
        .map_err(oracle_error)?;
    Ok(Json(RoutesResponse { routes }))
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/layers", get(handle_list_layers))
        .route("/api/v1/layers/channels", post(handle_create_channel))
        .route("/api/v1/layers/constraints", post(handle_inform_channel))
        .route("/api/v1/layers/disabled-nodes", post(handle_disable_node))
        .route("/api/v1/layers/age", post(handle_age))
        .route("/api/v1/reserve", post(handle_reserve))
        .route("/api/v1/unreserve", post(handle_unreserve))
        .route("/api/v1/routes", post(handle_get_routes))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: Arc<NodeState>) -> anyhow::Result<()> {
    let app = build_router(state);
    tracing::info!(listen_addr = %listener.local_addr()?, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
