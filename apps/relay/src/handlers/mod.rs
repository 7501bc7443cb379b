//! Per-connection session loops
//!
//! Each accepted WebSocket is served by one of these loops, depending on the
//! endpoint it connected to. Both read frames from the socket and push
//! outgoing frames into a channel drained by a dedicated writer task.

pub mod context;
pub mod external;

pub use context::run_context_session;
pub use external::run_external_session;
