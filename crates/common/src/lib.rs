//! Common types and utilities for the capture relay
//!
//! This crate provides the wire protocol, the internal broadcast bus, the
//! header rewriting primitives and the request filters shared by the relay
//! process and its tests.

pub mod bus;
pub mod constants;
pub mod error;
pub mod filter;
pub mod models;
pub mod protocol;
pub mod utils;
pub mod validation;

// Re-export commonly used types for convenience
pub use bus::{Envelope, InternalBus, Responder, SubscriberId};
pub use error::{RelayError, Result};
pub use filter::{MatchPattern, RequestFilter, ResourceType};
pub use models::{
    ActionFallback, ApiFeature, CaptureDescriptor, CaptureMode, CaptureTarget, ConnectionSession,
    RuntimeCapabilities, SessionState,
};
pub use protocol::{
    BaseUrlResponse, Command, ContextFrame, ErrorBody, InternalMessage, MessageId, RelayMessage,
    RelayResponse,
};
pub use utils::{
    RewritableHeader, current_timestamp_millis, generate_session_id, rewrite_reserved_headers,
};
