//! Background relay for the page capture extension
//!
//! Serves two kinds of WebSocket peers: external callers sending
//! `{id, cmd, args}` commands on `/external`, and extension-owned contexts
//! answering internal broadcasts on `/internal`. Alongside the relay it
//! carries the request header rewrite hook and the capture menu wiring.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod history;
pub mod interceptor;
pub mod menus;
pub mod network;
pub mod server;
