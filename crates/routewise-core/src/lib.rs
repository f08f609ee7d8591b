pub mod config;
pub mod error;
pub mod types;

pub use config::OracleConfig;
pub use error::CoreError;
pub use types::{
    now_timestamp, AmountMsat, AmountSat, ChannelDirection, ConstraintKind, NodeId,
    ShortChannelId,
};
