//! WebSocket listener routing connections to relay or context sessions

use anyhow::{Context, Result};
use capture_relay_common::constants::OUTGOING_CHANNEL_CAPACITY;
use capture_relay_common::{
    ConnectionSession, InternalBus, RelayError, RuntimeCapabilities, current_timestamp_millis,
    generate_session_id,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::dispatch::CommandRelay;
use crate::handlers::{run_context_session, run_external_session};

/// Connection endpoints, selected by request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Trusted external peer sending relay commands
    External,
    /// Extension-owned context subscribing to the internal bus
    Internal,
}

impl Endpoint {
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/external" => Some(Self::External),
            "/internal" => Some(Self::Internal),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::External => "/external",
            Self::Internal => "/internal",
        }
    }

    /// Whether the host exposes this endpoint at all
    pub fn is_enabled(&self, capabilities: &RuntimeCapabilities) -> bool {
        match self {
            Self::External => capabilities.has_external_connect,
            Self::Internal => true,
        }
    }
}

/// Bound listener plus the shared state handed to each connection
pub struct RelayServer {
    listener: TcpListener,
    relay: Arc<CommandRelay>,
    bus: InternalBus,
    capabilities: RuntimeCapabilities,
}

impl RelayServer {
    pub async fn bind(config: &Config, bus: InternalBus) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

        Ok(Self {
            listener,
            relay: Arc::new(CommandRelay::new(config.base_url.clone(), bus.clone())),
            bus,
            capabilities: config.capabilities,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn bus(&self) -> &InternalBus {
        &self.bus
    }

    /// Accept connections until the listener fails
    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            debug!("Accepted TCP connection from {}", peer);

            let relay = Arc::clone(&self.relay);
            let bus = self.bus.clone();
            let capabilities = self.capabilities;

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer, relay, bus, capabilities).await {
                    warn!("Connection from {} ended with error: {}", peer, e);
                }
            });
        }
    }
}

/// Perform the WebSocket handshake and run the endpoint's session loop
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    relay: Arc<CommandRelay>,
    bus: InternalBus,
    capabilities: RuntimeCapabilities,
) -> Result<()> {
    let mut endpoint = None;

    let ws_stream = accept_hdr_async(stream, |request: &Request, response: Response| {
        let path = request.uri().path();
        match Endpoint::from_path(path).filter(|e| e.is_enabled(&capabilities)) {
            Some(selected) => {
                endpoint = Some(selected);
                Ok(response)
            }
            None => Err(reject(StatusCode::NOT_FOUND, "Unknown endpoint")),
        }
    })
    .await
    .map_err(|e| RelayError::WebSocketError(e.to_string()))?;

    let endpoint = endpoint
        .ok_or_else(|| RelayError::ConnectionError("Handshake selected no endpoint".to_string()))?;
    debug!("{} connected to {}", peer, endpoint.path());

    let (write, read) = ws_stream.split();
    let (outgoing_tx, outgoing_rx) = mpsc::channel(OUTGOING_CHANNEL_CAPACITY);
    tokio::spawn(spawn_write_task(write, outgoing_rx));

    match endpoint {
        Endpoint::External => {
            let mut session = ConnectionSession::new(
                generate_session_id(),
                peer.to_string(),
                current_timestamp_millis(),
            );
            run_external_session(read, outgoing_tx, relay, &mut session).await;
        }
        Endpoint::Internal => {
            run_context_session(read, outgoing_tx, bus, &peer.to_string()).await;
        }
    }

    Ok(())
}

fn reject(status: StatusCode, reason: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(reason.to_string()));
    *response.status_mut() = status;
    response
}

/// Write task sends outgoing frames through the WebSocket
///
/// Exits when every sender is gone or the peer stops accepting frames.
async fn spawn_write_task<S>(mut write: S, mut outgoing_rx: mpsc::Receiver<WsMessage>)
where
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
{
    while let Some(message) = outgoing_rx.recv().await {
        if let Err(e) = write.send(message).await {
            error!("Failed to send message: {}", e);
            break;
        }
    }

    debug!("Write task exiting");
}
