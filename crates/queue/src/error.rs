//! Queue error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("max timeout {requested_ms}ms is below the {min_ms}ms floor")]
    MaxTimeoutTooSmall { requested_ms: u64, min_ms: u64 },

    #[error("no tokio runtime available to drive the display loop")]
    NoRuntime,

    #[error("global scheduler already installed")]
    AlreadyInstalled,

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}
