use std::fmt::Display;

use routewise_core::{AmountMsat, ChannelDirection, CoreError, NodeId, ShortChannelId};
use routewise_graph::GraphError;

/// Errors returned by the route oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("invalid parameter {field} ({value}): {reason}")]
    BadParam {
        field: String,
        value: String,
        reason: String,
    },

    #[error("channel {scid} already exists in layer {layer} with different values")]
    ChannelConflict { layer: String, scid: ShortChannelId },

    #[error("layer {0} already exists")]
    LayerExists(String),

    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    #[error(
        "overflow reserving {index}: {scidd} amount {amount} ({} reserved already)",
        describe(.reserved)
    )]
    ReserveOverflow {
        index: usize,
        scidd: ChannelDirection,
        amount: AmountMsat,
        reserved: Option<AmountMsat>,
    },

    #[error(
        "underflow unreserving {index}: {scidd} amount {amount} ({num_htlcs} reserved, amount {})",
        describe(.reserved)
    )]
    ReserveUnderflow {
        index: usize,
        scidd: ChannelDirection,
        amount: AmountMsat,
        num_htlcs: usize,
        reserved: Option<AmountMsat>,
    },

    #[error("no route found from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

fn describe(reserved: &Option<AmountMsat>) -> String {
    reserved
        .map(|r| r.to_string())
        .unwrap_or_else(|| "none".into())
}

impl OracleError {
    pub fn bad_param(field: &str, value: impl Display, reason: &str) -> Self {
        OracleError::BadParam {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Input the caller can fix, as opposed to a missing resource or an
    /// internal failure.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            OracleError::BadParam { .. }
                | OracleError::ChannelConflict { .. }
                | OracleError::LayerExists(_)
                | OracleError::ReserveOverflow { .. }
                | OracleError::ReserveUnderflow { .. }
                | OracleError::Core(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            OracleError::UnknownLayer(_) | OracleError::NoRoute { .. }
        )
    }
}
