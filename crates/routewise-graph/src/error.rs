use routewise_core::{CoreError, ShortChannelId};

/// Errors raised by graph sources and views.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("failed to read graph snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("channel {0} already exists")]
    DuplicateChannel(ShortChannelId),

    #[error("unknown channel {0}")]
    UnknownChannel(ShortChannelId),

    #[error("channel {0} connects a node to itself")]
    SelfLoop(ShortChannelId),

    #[error("local modifications are already applied")]
    LocalModsApplied,

    #[error(transparent)]
    Core(#[from] CoreError),
}
