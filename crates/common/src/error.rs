use thiserror::Error;

use crate::constants::NO_RECEIVER_MESSAGE;

/// Error types for the capture relay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    #[error("Invalid arguments for {cmd}: {reason}")]
    InvalidArguments { cmd: String, reason: String },

    /// Failure reported by the context that settled an internal broadcast.
    /// The message crosses the wire verbatim.
    #[error("{0}")]
    Remote(String),

    #[error("{}", NO_RECEIVER_MESSAGE)]
    NoReceiver,

    /// The broadcast was settled with `null`
    #[error("No result returned for {0}")]
    EmptyResult(String),

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("Invalid match pattern: {0}")]
    InvalidPattern(String),

    #[error("Unknown capability: {0}")]
    InvalidCapability(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Type alias for Results using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
