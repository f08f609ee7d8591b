/// Errors raised while parsing or validating core primitives.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid short channel id: {0}")]
    InvalidShortChannelId(String),

    #[error("invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("direction should be 0 or 1, got {0}")]
    InvalidDirection(u32),
}
